use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::errors::InternalError;
use crate::stores::AuditStore;
use crate::types::internal::audit::{AuditEvent, EventType};
use crate::types::internal::context::RequestContext;

/// Builder for security audit events
///
/// Provides a fluent API for constructing audit events with type-safe field addition
/// and hashing of sensitive values.
///
/// # Example
/// ```ignore
/// AuditBuilder::new(audit_store.clone(), EventType::LoginFailure)
///     .with_context(ctx)
///     .add_sensitive("email", "user@example.com")
///     .add_field("reason", "invalid_credentials")
///     .write()
///     .await?;
/// ```
pub struct AuditBuilder {
    event_type: EventType,
    user_id: Option<String>,
    ip_address: Option<String>,
    jwt_id: Option<String>,
    data: HashMap<String, serde_json::Value>,
    store: Arc<AuditStore>,
}

impl AuditBuilder {
    pub fn new(store: Arc<AuditStore>, event_type: EventType) -> Self {
        Self {
            event_type,
            user_id: None,
            ip_address: None,
            jwt_id: None,
            data: HashMap::new(),
            store,
        }
    }

    /// Populate builder fields from RequestContext
    ///
    /// - `actor_id` -> `user_id` (who performed the action)
    /// - `ip_address` -> `ip_address`
    /// - `jti` from claims -> `jwt_id`
    /// - request_id and source -> `data`
    pub fn with_context(mut self, ctx: &RequestContext) -> Self {
        self.user_id = Some(ctx.actor_id.clone());
        self.ip_address = ctx.ip_address.map(|ip| ip.to_string());
        self.jwt_id = ctx.claims.as_ref().map(|claims| claims.jti.clone());

        self.data
            .insert("request_id".to_string(), json!(ctx.request_id.to_string()));
        self.data
            .insert("source".to_string(), json!(ctx.source.as_str()));
        self.data
            .insert("authenticated".to_string(), json!(ctx.authenticated));
        self
    }

    /// Override the user the event is about
    pub fn user_id(mut self, id: impl Into<String>) -> Self {
        self.user_id = Some(id.into());
        self
    }

    pub fn jwt_id(mut self, id: impl Into<String>) -> Self {
        self.jwt_id = Some(id.into());
        self
    }

    /// Add an arbitrary field. Values that fail to serialize are skipped.
    pub fn add_field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.data.insert(key.into(), json_value);
        }
        self
    }

    /// Add a field as a SHA-256 digest
    ///
    /// Same input always yields the same digest, so events can be correlated
    /// without storing the raw value (emails of failed logins, for one).
    pub fn add_sensitive(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(&value) {
            let mut hasher = Sha256::new();
            hasher.update(json_value.to_string().as_bytes());
            let hash_hex = format!("sha256:{:x}", hasher.finalize());
            self.data.insert(key.into(), json!(hash_hex));
        }
        self
    }

    pub fn build(self) -> AuditEvent {
        AuditEvent {
            event_type: self.event_type,
            user_id: self.user_id,
            ip_address: self.ip_address,
            jwt_id: self.jwt_id,
            data: self.data,
        }
    }

    pub async fn write(self) -> Result<(), InternalError> {
        let store = self.store.clone();
        store.write_event(self.build()).await
    }
}
