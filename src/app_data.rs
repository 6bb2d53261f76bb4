use std::sync::Arc;

use crate::audit::AuditLogger;
use crate::config::{DatabaseConnections, SecretManager, Settings};
use crate::providers::{Clock, CryptoProvider, MutationProvider, TokenProvider};
use crate::stores::{ActivityStore, AssetStore, AuditStore, RefreshTokenStore, UserStore};

/// Centralized application data following the main-owned stores pattern
///
/// Everything is created once at startup and shared across coordinators.
///
/// ```text
/// main.rs
///   ↓ settings, secrets, clock, migrated connections
/// AppData::new()
///   ├─ stores (user, asset, activity, refresh_token, audit)
///   ├─ providers (crypto, token, mutation)
///   └─ audit_logger
///   ↓ wrapped in Arc<AppData>
///   ├─ AuthCoordinator::new(app_data)
///   ├─ UserCoordinator::new(app_data)
///   └─ AssetCoordinator::new(app_data)
/// ```
pub struct AppData {
    pub connections: DatabaseConnections,
    pub settings: Arc<Settings>,
    pub secret_manager: Arc<SecretManager>,
    pub clock: Arc<dyn Clock>,

    pub user_store: Arc<UserStore>,
    pub asset_store: Arc<AssetStore>,
    pub activity_store: Arc<ActivityStore>,
    pub refresh_token_store: Arc<RefreshTokenStore>,
    pub audit_store: Arc<AuditStore>,

    pub crypto_provider: Arc<CryptoProvider>,
    pub token_provider: Arc<TokenProvider>,
    pub mutation_provider: Arc<MutationProvider>,
    pub audit_logger: Arc<AuditLogger>,
}

impl AppData {
    /// Build stores and providers
    ///
    /// Connections should already be migrated.
    pub fn new(
        connections: DatabaseConnections,
        settings: Settings,
        secret_manager: SecretManager,
        clock: Arc<dyn Clock>,
    ) -> Self {
        tracing::debug!("Initializing AppData...");
        let settings = Arc::new(settings);
        let secret_manager = Arc::new(secret_manager);

        let user_store = Arc::new(UserStore::new(clock.clone()));
        let asset_store = Arc::new(AssetStore::new(clock.clone()));
        let activity_store = Arc::new(ActivityStore::new(clock.clone()));
        let refresh_token_store = Arc::new(RefreshTokenStore::new(clock.clone()));
        let audit_store = Arc::new(AuditStore::new(connections.audit.clone(), clock.clone()));

        let crypto_provider = Arc::new(CryptoProvider::new(
            secret_manager.password_pepper(),
            settings.argon2(),
        ));
        let token_provider = Arc::new(TokenProvider::new(
            secret_manager.clone(),
            crypto_provider.clone(),
            clock.clone(),
            settings.access_token_ttl_seconds(),
            settings.refresh_token_ttl_seconds(),
        ));
        let mutation_provider = Arc::new(MutationProvider::new(activity_store.clone()));
        let audit_logger = Arc::new(AuditLogger::new(audit_store.clone()));

        tracing::debug!("AppData initialization complete");

        Self {
            connections,
            settings,
            secret_manager,
            clock,
            user_store,
            asset_store,
            activity_store,
            refresh_token_store,
            audit_store,
            crypto_provider,
            token_provider,
            mutation_provider,
            audit_logger,
        }
    }
}
