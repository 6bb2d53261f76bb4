use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Failed to write audit log: {0}")]
    LogWriteFailed(String),

    #[error("Failed to serialize audit data: {0}")]
    Serialization(#[from] serde_json::Error),
}
