// Test utilities shared across unit tests
// Only compiled when running tests

use std::sync::Arc;

use crate::app_data::AppData;
use crate::config::{Argon2Settings, DatabaseConnections, MockEnvironment, SecretManager, Settings};
use crate::providers::mutation_provider::to_state;
use crate::providers::{CryptoProvider, ManualClock};
use crate::stores::NewUser;
use crate::types::internal::activity::{ActivityAction, EntityType};
use crate::types::internal::context::RequestContext;
use crate::types::internal::role::Role;
use crate::types::internal::user::{User, UserStatus};

/// Password of every user created by `seed_user`
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Start of the manual clock in `setup_test_app_data` (2024-01-01T00:00:00Z)
pub const TEST_EPOCH: i64 = 1_704_067_200;

/// Cheap Argon2 parameters so tests stay fast
pub fn fast_argon2() -> Argon2Settings {
    Argon2Settings {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    }
}

pub fn test_environment() -> MockEnvironment {
    MockEnvironment::empty().with_vars(&[
        ("JWT_SECRET", "test-secret-key-minimum-32-characters-long"),
        ("PASSWORD_PEPPER", "test-pepper-for-unit-tests"),
        ("REFRESH_TOKEN_SECRET", "test-refresh-secret-minimum-32-chars"),
    ])
}

pub fn test_secret_manager() -> Arc<SecretManager> {
    Arc::new(
        SecretManager::from_env_provider(&test_environment())
            .expect("Test secrets should be valid"),
    )
}

pub fn test_crypto_provider() -> Arc<CryptoProvider> {
    Arc::new(CryptoProvider::new("test-pepper-for-unit-tests", fast_argon2()))
}

/// Creates in-memory main and audit databases with migrations applied
pub async fn setup_test_connections() -> DatabaseConnections {
    let connections = DatabaseConnections::connect("sqlite::memory:", "sqlite::memory:")
        .await
        .expect("Failed to create test databases");
    connections
        .migrate()
        .await
        .expect("Failed to run test migrations");
    connections
}

/// Full AppData over in-memory databases and a manual clock
pub async fn setup_test_app_data() -> (Arc<AppData>, Arc<ManualClock>) {
    let connections = setup_test_connections().await;
    let env = test_environment();
    let settings = Settings::from_env_provider(&env)
        .expect("Default settings should load")
        .with_argon2(fast_argon2());
    let secret_manager =
        SecretManager::from_env_provider(&env).expect("Test secrets should be valid");
    let clock = Arc::new(ManualClock::new(TEST_EPOCH));

    let app_data = AppData::new(connections, settings, secret_manager, clock.clone());
    (Arc::new(app_data), clock)
}

/// Insert a user with `TEST_PASSWORD` and its CREATED record
pub async fn seed_user(app_data: &AppData, email: &str, role: Role, status: UserStatus) -> User {
    let password_hash = app_data
        .crypto_provider
        .hash_password(TEST_PASSWORD)
        .expect("Failed to hash test password");
    let name = email.split('@').next().unwrap_or(email).to_string();

    let user = app_data
        .user_store
        .insert(
            &app_data.connections.main,
            NewUser {
                name,
                email: email.to_string(),
                password_hash,
                role,
                status,
            },
        )
        .await
        .expect("Failed to seed user");

    app_data
        .mutation_provider
        .record(
            &app_data.connections.main,
            &RequestContext::for_system("seed"),
            EntityType::User,
            &user.id,
            ActivityAction::Created,
            None,
            Some(to_state(&user.snapshot()).expect("Snapshot should serialize")),
        )
        .await
        .expect("Failed to record seed activity");

    user
}

/// Context as the API layer would build it for a valid bearer token of `user`
pub fn authenticated_context(app_data: &AppData, user: &User) -> RequestContext {
    let (_token, claims) = app_data
        .token_provider
        .generate_access_token(user)
        .expect("Failed to sign test token");
    RequestContext::new().with_auth(claims)
}
