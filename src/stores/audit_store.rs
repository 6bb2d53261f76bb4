use std::sync::Arc;

use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

use crate::errors::InternalError;
use crate::errors::internal::AuditError;
use crate::providers::Clock;
use crate::types::db::audit_event;
use crate::types::internal::audit::AuditEvent;

/// Repository for security audit events in the audit database
pub struct AuditStore {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
}

impl AuditStore {
    pub fn new(db: DatabaseConnection, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Write an audit event to the database
    ///
    /// Serializes the data map to JSON and inserts into `audit_events`.
    /// Events without a user (failed logins for unknown emails) are stored as `unknown`.
    ///
    /// # Errors
    ///
    /// Returns `InternalError` if serialization or database insert fails
    pub async fn write_event(&self, event: AuditEvent) -> Result<(), InternalError> {
        let data_json = serde_json::to_string(&event.data)
            .map_err(|e| AuditError::LogWriteFailed(format!("Failed to serialize audit data: {}", e)))?;

        let audit_event = audit_event::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            timestamp: Set(self.clock.now_datetime().to_rfc3339()),
            event_type: Set(event.event_type.to_string()),
            user_id: Set(event.user_id.unwrap_or_else(|| "unknown".to_string())),
            ip_address: Set(event.ip_address),
            jwt_id: Set(event.jwt_id),
            data: Set(data_json),
        };

        audit_event
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("write_audit_event", e))?;

        Ok(())
    }
}
