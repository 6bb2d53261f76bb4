use std::sync::Arc;

use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::app_data::AppData;
use crate::audit::AuditLogger;
use crate::errors::InternalError;
use crate::errors::internal::{AuthorizationError, CredentialError};
use crate::providers::mutation_provider::to_state;
use crate::providers::{Clock, CryptoProvider, MutationProvider, TokenProvider, input_validator};
use crate::stores::{NewUser, RefreshTokenStore, UserStore};
use crate::types::internal::activity::{ActivityAction, EntityType};
use crate::types::internal::auth::Claims;
use crate::types::internal::context::RequestContext;
use crate::types::internal::role::Role;
use crate::types::internal::user::{User, UserStatus};

/// Tokens and profile returned by a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub access_token: String,
    pub refresh_token: String,
    pub claims: Claims,
    pub user: User,
}

/// Authentication coordinator: registration, login, refresh, logout
///
/// Access tokens are stateless; refresh tokens are opaque and stored hashed.
/// A refresh re-reads the user so role and status changes apply from the next
/// access token on.
pub struct AuthCoordinator {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
    user_store: Arc<UserStore>,
    refresh_token_store: Arc<RefreshTokenStore>,
    crypto_provider: Arc<CryptoProvider>,
    token_provider: Arc<TokenProvider>,
    mutation_provider: Arc<MutationProvider>,
    audit_logger: Arc<AuditLogger>,
}

impl AuthCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.connections.main.clone(),
            clock: app_data.clock.clone(),
            user_store: app_data.user_store.clone(),
            refresh_token_store: app_data.refresh_token_store.clone(),
            crypto_provider: app_data.crypto_provider.clone(),
            token_provider: app_data.token_provider.clone(),
            mutation_provider: app_data.mutation_provider.clone(),
            audit_logger: app_data.audit_logger.clone(),
        }
    }

    /// Useful for the API layer, which validates bearer tokens itself
    pub fn token_provider(&self) -> Arc<TokenProvider> {
        self.token_provider.clone()
    }

    pub fn audit_logger(&self) -> Arc<AuditLogger> {
        self.audit_logger.clone()
    }

    /// Self-registration
    ///
    /// The account is always created `pending` with role GUEST and must be
    /// approved by an administrator before it can log in. The CREATED record
    /// carries no actor.
    ///
    /// # Returns
    /// * `Ok(User)` - Newly created pending account
    /// * `Err(InternalError::Validation)` - Bad name, email or password
    /// * `Err(UserError::DuplicateEmail)` - Email already registered
    pub async fn register(
        &self,
        ctx: &RequestContext,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, InternalError> {
        input_validator::validate_required("name", name)?;
        input_validator::validate_email(email)?;
        input_validator::validate_password(password)?;

        let password_hash = self.crypto_provider.hash_password(password)?;

        let txn = self.db.begin().await.map_err(InternalError::transaction_begin)?;
        let user = self
            .user_store
            .insert(
                &txn,
                NewUser {
                    name: name.trim().to_string(),
                    email: email.to_string(),
                    password_hash,
                    role: Role::SELF_REGISTRATION,
                    status: UserStatus::Pending,
                },
            )
            .await?;
        self.mutation_provider
            .record(
                &txn,
                ctx,
                EntityType::User,
                &user.id,
                ActivityAction::Created,
                None,
                Some(to_state(&user.snapshot())?),
            )
            .await?;
        txn.commit().await.map_err(InternalError::transaction_commit)?;

        tracing::info!("User {} registered, pending approval", user.id);
        Ok(user)
    }

    /// Verify credentials and issue an access/refresh token pair
    ///
    /// Unknown email and wrong password produce the same error. Approval is
    /// only checked after the password verifies.
    ///
    /// # Returns
    /// * `Ok(LoginOutcome)` - Tokens and the caller's profile
    /// * `Err(CredentialError::InvalidCredentials)` - Unknown email or wrong password
    /// * `Err(CredentialError::AccountNotApproved)` - Password correct, status not approved
    pub async fn login(
        &self,
        ctx: &RequestContext,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome, InternalError> {
        let Some(credentials) = self
            .user_store
            .find_credentials_by_email(&self.db, email)
            .await?
        else {
            self.crypto_provider.verify_without_account(password)?;
            self.audit_logger
                .log_login_failure(ctx, email, None, "unknown_email")
                .await;
            return Err(CredentialError::InvalidCredentials.into());
        };

        if !self
            .crypto_provider
            .verify_password(password, &credentials.password_hash)?
        {
            self.audit_logger
                .log_login_failure(ctx, email, Some(&credentials.user.id), "wrong_password")
                .await;
            return Err(CredentialError::InvalidCredentials.into());
        }

        let mut user = credentials.user;
        if user.status != UserStatus::Approved {
            self.audit_logger
                .log_login_failure(ctx, email, Some(&user.id), "account_not_approved")
                .await;
            return Err(CredentialError::AccountNotApproved.into());
        }

        let (access_token, claims) = self.token_provider.generate_access_token(&user)?;
        let refresh_token = self.token_provider.generate_refresh_token();
        let token_hash = self.token_provider.hash_refresh_token(&refresh_token)?;
        let expires_at = self.token_provider.refresh_expiration();

        let txn = self.db.begin().await.map_err(InternalError::transaction_begin)?;
        self.refresh_token_store
            .insert(&txn, token_hash, &user.id, expires_at)
            .await?;
        self.user_store.touch_last_login(&txn, &user.id).await?;
        txn.commit().await.map_err(InternalError::transaction_commit)?;
        user.last_login_at = Some(self.clock.now());

        self.audit_logger
            .log_login_success(ctx, &user.id, &claims.jti)
            .await;
        self.audit_logger
            .log_refresh_token_issued(ctx, &user.id, expires_at)
            .await;
        tracing::info!("User {} logged in", user.id);

        Ok(LoginOutcome {
            access_token,
            refresh_token,
            claims,
            user,
        })
    }

    /// Exchange a refresh token for a new access token
    ///
    /// The refresh token itself is not rotated. A token is expired once
    /// `expires_at <= now`; no access token is minted for it.
    ///
    /// # Returns
    /// * `Ok((token, claims))` - New access token reflecting the current role
    /// * `Err(CredentialError::InvalidToken)` - Unknown token or deleted user
    /// * `Err(CredentialError::ExpiredToken)` - Token past its expiry
    /// * `Err(CredentialError::AccountNotApproved)` - User no longer approved
    pub async fn refresh(
        &self,
        ctx: &RequestContext,
        refresh_token: &str,
    ) -> Result<(String, Claims), InternalError> {
        let token_hash = self.token_provider.hash_refresh_token(refresh_token)?;

        let Some(stored) = self
            .refresh_token_store
            .find_by_hash(&self.db, &token_hash)
            .await?
        else {
            self.audit_logger
                .log_refresh_token_rejected(ctx, None, "not_found")
                .await;
            return Err(CredentialError::invalid_token("refresh_token", "not found").into());
        };

        if stored.expires_at <= self.clock.now() {
            self.audit_logger
                .log_refresh_token_rejected(ctx, Some(&stored.user_id), "expired")
                .await;
            return Err(CredentialError::ExpiredToken("refresh_token".to_string()).into());
        }

        let Some(user) = self.user_store.find_by_id(&self.db, &stored.user_id).await? else {
            self.audit_logger
                .log_refresh_token_rejected(ctx, Some(&stored.user_id), "user_deleted")
                .await;
            return Err(CredentialError::invalid_token("refresh_token", "user not found").into());
        };

        if user.status != UserStatus::Approved {
            self.audit_logger
                .log_refresh_token_rejected(ctx, Some(&user.id), "account_not_approved")
                .await;
            return Err(CredentialError::AccountNotApproved.into());
        }

        let (access_token, claims) = self.token_provider.generate_access_token(&user)?;
        self.audit_logger
            .log_jwt_issued(ctx, &user.id, &claims.jti)
            .await;
        tracing::debug!("Access token refreshed for user {}", user.id);

        Ok((access_token, claims))
    }

    /// Revoke a refresh token. Unknown or absent tokens are not an error.
    pub async fn logout(
        &self,
        ctx: &RequestContext,
        refresh_token: Option<&str>,
    ) -> Result<(), InternalError> {
        let Some(refresh_token) = refresh_token else {
            return Ok(());
        };

        let token_hash = self.token_provider.hash_refresh_token(refresh_token)?;
        if let Some(user_id) = self
            .refresh_token_store
            .delete_by_hash(&self.db, &token_hash)
            .await?
        {
            self.audit_logger
                .log_refresh_token_revoked(ctx, &user_id, 1, "logout")
                .await;
            tracing::info!("User {} logged out", user_id);
        }

        Ok(())
    }

    /// Claims of the authenticated caller
    pub fn whoami(&self, ctx: &RequestContext) -> Result<Claims, InternalError> {
        ctx.claims
            .clone()
            .ok_or_else(|| AuthorizationError::Unauthenticated.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::internal::UserError;
    use crate::stores::UserPatch;
    use crate::test::utils::{TEST_PASSWORD, seed_user, setup_test_app_data};

    const DAY: i64 = 24 * 60 * 60;

    #[tokio::test]
    async fn test_register_creates_pending_guest_with_unattributed_record() {
        let (app_data, _clock) = setup_test_app_data().await;
        let coordinator = AuthCoordinator::new(app_data.clone());

        let user = coordinator
            .register(&RequestContext::new(), "Ada", "ada@example.com", TEST_PASSWORD)
            .await
            .unwrap();

        assert_eq!(user.status, UserStatus::Pending);
        assert_eq!(user.role, Role::Guest);

        let records = app_data
            .activity_store
            .list_for(&app_data.connections.main, EntityType::User, &user.id)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, ActivityAction::Created);
        assert_eq!(records[0].actor_user_id, None);
        assert_eq!(records[0].before, None);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_is_conflict() {
        let (app_data, _clock) = setup_test_app_data().await;
        let coordinator = AuthCoordinator::new(app_data.clone());
        let ctx = RequestContext::new();

        coordinator
            .register(&ctx, "Ada", "ada@example.com", TEST_PASSWORD)
            .await
            .unwrap();
        let result = coordinator
            .register(&ctx, "Eve", "ada@example.com", TEST_PASSWORD)
            .await;

        assert!(matches!(
            result,
            Err(InternalError::User(UserError::DuplicateEmail { .. }))
        ));
        assert_eq!(
            app_data
                .user_store
                .count_all(&app_data.connections.main)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_register_rejects_short_password() {
        let (app_data, _clock) = setup_test_app_data().await;
        let coordinator = AuthCoordinator::new(app_data);

        let result = coordinator
            .register(&RequestContext::new(), "Ada", "ada@example.com", "short")
            .await;
        assert!(matches!(result, Err(InternalError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_login_issues_tokens_with_identity_claims() {
        let (app_data, _clock) = setup_test_app_data().await;
        let user = seed_user(&app_data, "tech@example.com", Role::Technician, UserStatus::Approved).await;
        let coordinator = AuthCoordinator::new(app_data.clone());

        let outcome = coordinator
            .login(&RequestContext::new(), "tech@example.com", TEST_PASSWORD)
            .await
            .unwrap();

        let claims = app_data
            .token_provider
            .validate_access_token(&outcome.access_token)
            .unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "tech@example.com");
        assert_eq!(claims.role, Role::Technician);
        assert_eq!(outcome.refresh_token.len(), 43);
        assert!(outcome.user.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_login_unknown_email_and_wrong_password_are_indistinguishable() {
        let (app_data, _clock) = setup_test_app_data().await;
        seed_user(&app_data, "tech@example.com", Role::Technician, UserStatus::Approved).await;
        let coordinator = AuthCoordinator::new(app_data);
        let ctx = RequestContext::new();

        let unknown = coordinator.login(&ctx, "nobody@example.com", TEST_PASSWORD).await;
        let wrong = coordinator.login(&ctx, "tech@example.com", "wrong-password").await;

        assert!(matches!(
            unknown,
            Err(InternalError::Credential(CredentialError::InvalidCredentials))
        ));
        assert!(matches!(
            wrong,
            Err(InternalError::Credential(CredentialError::InvalidCredentials))
        ));
    }

    #[tokio::test]
    async fn test_login_pending_account_rejected_only_after_password_check() {
        let (app_data, _clock) = setup_test_app_data().await;
        seed_user(&app_data, "new@example.com", Role::Guest, UserStatus::Pending).await;
        let coordinator = AuthCoordinator::new(app_data);
        let ctx = RequestContext::new();

        let wrong = coordinator.login(&ctx, "new@example.com", "wrong-password").await;
        assert!(matches!(
            wrong,
            Err(InternalError::Credential(CredentialError::InvalidCredentials))
        ));

        let right = coordinator.login(&ctx, "new@example.com", TEST_PASSWORD).await;
        assert!(matches!(
            right,
            Err(InternalError::Credential(CredentialError::AccountNotApproved))
        ));
    }

    #[tokio::test]
    async fn test_refresh_reflects_current_role() {
        let (app_data, _clock) = setup_test_app_data().await;
        let user = seed_user(&app_data, "tech@example.com", Role::Technician, UserStatus::Approved).await;
        let coordinator = AuthCoordinator::new(app_data.clone());
        let ctx = RequestContext::new();

        let outcome = coordinator
            .login(&ctx, "tech@example.com", TEST_PASSWORD)
            .await
            .unwrap();

        app_data
            .user_store
            .update(
                &app_data.connections.main,
                &user.id,
                UserPatch {
                    role: Some(Role::Engineer),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let (_token, claims) = coordinator.refresh(&ctx, &outcome.refresh_token).await.unwrap();
        assert_eq!(claims.role, Role::Engineer);
    }

    #[tokio::test]
    async fn test_refresh_after_expiry_is_rejected() {
        let (app_data, clock) = setup_test_app_data().await;
        seed_user(&app_data, "tech@example.com", Role::Technician, UserStatus::Approved).await;
        let coordinator = AuthCoordinator::new(app_data);
        let ctx = RequestContext::new();

        let outcome = coordinator
            .login(&ctx, "tech@example.com", TEST_PASSWORD)
            .await
            .unwrap();
        clock.advance(8 * DAY);

        let result = coordinator.refresh(&ctx, &outcome.refresh_token).await;
        assert!(matches!(
            result,
            Err(InternalError::Credential(CredentialError::ExpiredToken(_)))
        ));
    }

    #[tokio::test]
    async fn test_refresh_with_unknown_token_is_invalid() {
        let (app_data, _clock) = setup_test_app_data().await;
        let coordinator = AuthCoordinator::new(app_data);

        let result = coordinator
            .refresh(&RequestContext::new(), "not-a-real-token")
            .await;
        assert!(matches!(
            result,
            Err(InternalError::Credential(CredentialError::InvalidToken { .. }))
        ));
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let (app_data, _clock) = setup_test_app_data().await;
        seed_user(&app_data, "tech@example.com", Role::Technician, UserStatus::Approved).await;
        let coordinator = AuthCoordinator::new(app_data);
        let ctx = RequestContext::new();

        let outcome = coordinator
            .login(&ctx, "tech@example.com", TEST_PASSWORD)
            .await
            .unwrap();

        coordinator.logout(&ctx, Some(&outcome.refresh_token)).await.unwrap();
        coordinator.logout(&ctx, Some(&outcome.refresh_token)).await.unwrap();
        coordinator.logout(&ctx, None).await.unwrap();

        let result = coordinator.refresh(&ctx, &outcome.refresh_token).await;
        assert!(matches!(
            result,
            Err(InternalError::Credential(CredentialError::InvalidToken { .. }))
        ));
    }

    #[tokio::test]
    async fn test_whoami_requires_claims() {
        let (app_data, _clock) = setup_test_app_data().await;
        let coordinator = AuthCoordinator::new(app_data);
        assert!(matches!(
            coordinator.whoami(&RequestContext::new()),
            Err(InternalError::Authorization(AuthorizationError::Unauthenticated))
        ));
    }
}
