use std::sync::Arc;

use crate::audit::AuditBuilder;
use crate::stores::AuditStore;
use crate::types::internal::audit::EventType;
use crate::types::internal::context::RequestContext;

/// Writes security events to the audit database
///
/// Best-effort: a failed write is reported through `tracing` and never fails the
/// request that triggered it.
pub struct AuditLogger {
    audit_store: Arc<AuditStore>,
}

impl AuditLogger {
    pub fn new(audit_store: Arc<AuditStore>) -> Self {
        Self { audit_store }
    }

    pub fn builder(&self, event_type: EventType) -> AuditBuilder {
        AuditBuilder::new(self.audit_store.clone(), event_type)
    }

    async fn write(&self, builder: AuditBuilder) {
        if let Err(e) = builder.write().await {
            tracing::error!("Failed to write audit event: {}", e);
        }
    }

    /// Successful login; `jwt_id` is the access token just issued
    pub async fn log_login_success(&self, ctx: &RequestContext, user_id: &str, jwt_id: &str) {
        self.write(
            self.builder(EventType::LoginSuccess)
                .with_context(ctx)
                .user_id(user_id)
                .jwt_id(jwt_id),
        )
        .await;
    }

    /// Failed login. The attempted email is stored hashed.
    pub async fn log_login_failure(
        &self,
        ctx: &RequestContext,
        email: &str,
        user_id: Option<&str>,
        reason: &str,
    ) {
        let mut builder = self
            .builder(EventType::LoginFailure)
            .with_context(ctx)
            .add_sensitive("email", email)
            .add_field("reason", reason);
        if let Some(user_id) = user_id {
            builder = builder.user_id(user_id);
        }
        self.write(builder).await;
    }

    /// Access token issued outside of login (refresh)
    pub async fn log_jwt_issued(&self, ctx: &RequestContext, user_id: &str, jwt_id: &str) {
        self.write(
            self.builder(EventType::JwtIssued)
                .with_context(ctx)
                .user_id(user_id)
                .jwt_id(jwt_id),
        )
        .await;
    }

    pub async fn log_jwt_validation_failure(&self, ctx: &RequestContext, reason: &str) {
        self.write(
            self.builder(EventType::JwtValidationFailure)
                .with_context(ctx)
                .add_field("reason", reason),
        )
        .await;
    }

    pub async fn log_refresh_token_issued(&self, ctx: &RequestContext, user_id: &str, expires_at: i64) {
        self.write(
            self.builder(EventType::RefreshTokenIssued)
                .with_context(ctx)
                .user_id(user_id)
                .add_field("expires_at", expires_at),
        )
        .await;
    }

    /// Refresh tokens removed by logout or account deletion
    pub async fn log_refresh_token_revoked(
        &self,
        ctx: &RequestContext,
        user_id: &str,
        count: u64,
        reason: &str,
    ) {
        self.write(
            self.builder(EventType::RefreshTokenRevoked)
                .with_context(ctx)
                .user_id(user_id)
                .add_field("count", count)
                .add_field("reason", reason),
        )
        .await;
    }

    pub async fn log_refresh_token_rejected(
        &self,
        ctx: &RequestContext,
        user_id: Option<&str>,
        reason: &str,
    ) {
        let mut builder = self
            .builder(EventType::RefreshTokenRejected)
            .with_context(ctx)
            .add_field("reason", reason);
        if let Some(user_id) = user_id {
            builder = builder.user_id(user_id);
        }
        self.write(builder).await;
    }

    /// Permission check failed; nothing was mutated
    pub async fn log_authorization_denied(
        &self,
        ctx: &RequestContext,
        operation: &str,
        target_id: Option<&str>,
        reason: &str,
    ) {
        self.write(
            self.builder(EventType::AuthorizationDenied)
                .with_context(ctx)
                .add_field("operation", operation)
                .add_field("target_id", target_id)
                .add_field("reason", reason),
        )
        .await;
    }

    /// Free-form event, e.g. CLI bootstrap of an admin account
    pub async fn log_custom(&self, ctx: &RequestContext, event_type: &str, subject_id: &str) {
        self.write(
            self.builder(EventType::Custom(event_type.to_string()))
                .with_context(ctx)
                .add_field("subject_id", subject_id),
        )
        .await;
    }
}
