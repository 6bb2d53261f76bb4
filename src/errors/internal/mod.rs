use thiserror::Error;

pub mod asset;
pub mod audit;
pub mod authorization;
pub mod credential;
pub mod database;
pub mod user;

pub use asset::AssetError;
pub use audit::AuditError;
pub use authorization::AuthorizationError;
pub use credential::CredentialError;
pub use database::DatabaseError;
pub use user::UserError;

/// Internal error type for store, provider and coordinator operations
///
/// Infrastructure errors (database, parse, crypto) are shared; domain errors are grouped per area.
/// Not exposed via API - endpoints must convert to AuthError or ManagementError.
#[derive(Error, Debug)]
pub enum InternalError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Parse error: failed to parse {value_type}: {message}")]
    Parse {
        value_type: String,
        message: String,
    },

    #[error("Crypto error: {operation} failed: {message}")]
    Crypto {
        operation: String,
        message: String,
    },

    #[error("Validation failed for {field}: {message}")]
    Validation {
        field: String,
        message: String,
    },

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    #[error(transparent)]
    User(#[from] UserError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Audit(#[from] AuditError),
}

impl InternalError {
    pub fn database(operation: &str, source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::Operation {
            operation: operation.to_string(),
            source,
        })
    }

    pub fn transaction_begin(source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::TransactionBegin { source })
    }

    pub fn transaction_commit(source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::TransactionCommit { source })
    }

    pub fn parse(value_type: &str, message: impl Into<String>) -> InternalError {
        InternalError::Parse {
            value_type: value_type.to_string(),
            message: message.into(),
        }
    }

    pub fn crypto(operation: &str, message: impl Into<String>) -> InternalError {
        InternalError::Crypto {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    pub fn validation(field: &str, message: impl Into<String>) -> InternalError {
        InternalError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// True for database, parse and crypto failures that map to a generic 500
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            InternalError::Database(_)
                | InternalError::Parse { .. }
                | InternalError::Crypto { .. }
                | InternalError::Audit(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_message() {
        let err = InternalError::parse("role", "unknown role 'ROOT'");
        assert_eq!(
            err.to_string(),
            "Parse error: failed to parse role: unknown role 'ROOT'"
        );
        assert!(err.is_infrastructure());
    }

    #[test]
    fn test_domain_errors_are_not_infrastructure() {
        let err: InternalError = UserError::NotFound {
            user_id: "u-1".to_string(),
        }
        .into();
        assert!(!err.is_infrastructure());

        let err = InternalError::validation("email", "must contain '@'");
        assert!(!err.is_infrastructure());
    }

    #[test]
    fn test_database_helper_keeps_operation() {
        let err = InternalError::database("insert_user", sea_orm::DbErr::Custom("boom".into()));
        assert!(err.to_string().contains("insert_user"));
    }
}
