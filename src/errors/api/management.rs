use crate::errors::internal::{
    AssetError, AuthorizationError, CredentialError, InternalError, UserError,
};
use poem_openapi::{ApiResponse, Object, payload::Json};
use std::fmt;

/// Standardized error response for user and asset management endpoints
#[derive(Object, Debug)]
pub struct ManagementErrorResponse {
    /// Error code identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code
    pub status_code: u16,
}

/// Errors returned by user and asset management endpoints
#[derive(ApiResponse, Debug)]
pub enum ManagementError {
    /// Missing, invalid or expired access token
    #[oai(status = 401)]
    Unauthenticated(Json<ManagementErrorResponse>),

    /// Caller's role does not permit the operation, or it targets the caller
    #[oai(status = 403)]
    Forbidden(Json<ManagementErrorResponse>),

    /// Target user or asset does not exist
    #[oai(status = 404)]
    NotFound(Json<ManagementErrorResponse>),

    /// Uniqueness or lifecycle conflict
    #[oai(status = 409)]
    Conflict(Json<ManagementErrorResponse>),

    /// Request body failed validation
    #[oai(status = 400)]
    BadRequest(Json<ManagementErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<ManagementErrorResponse>),
}

impl ManagementError {
    fn body(
        error: &str,
        message: impl Into<String>,
        status_code: u16,
    ) -> Json<ManagementErrorResponse> {
        Json(ManagementErrorResponse {
            error: error.to_string(),
            message: message.into(),
            status_code,
        })
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ManagementError::Unauthenticated(Self::body("unauthenticated", message, 401))
    }

    pub fn forbidden(error: &str, message: impl Into<String>) -> Self {
        ManagementError::Forbidden(Self::body(error, message, 403))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ManagementError::NotFound(Self::body("not_found", message, 404))
    }

    pub fn conflict(error: &str, message: impl Into<String>) -> Self {
        ManagementError::Conflict(Self::body(error, message, 409))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ManagementError::BadRequest(Self::body("validation_failed", message, 400))
    }

    /// Convert InternalError to ManagementError
    ///
    /// Authentication → 401, authorization → 403, missing entity → 404,
    /// uniqueness or retired asset → 409, validation → 400, everything else → 500.
    pub fn from_internal_error(err: InternalError) -> Self {
        match &err {
            _ if err.is_infrastructure() => {
                tracing::error!("Internal error in management operation: {}", err);
                Self::internal_server_error()
            }

            InternalError::Authorization(AuthorizationError::Unauthenticated) => {
                Self::unauthenticated("Authentication required")
            }
            InternalError::Credential(CredentialError::ExpiredToken(_)) => {
                Self::unauthenticated("Access token has expired")
            }
            InternalError::Credential(_) => Self::unauthenticated("Invalid access token"),
            InternalError::Authorization(AuthorizationError::SelfManagement { .. }) => {
                tracing::warn!("Self-management attempt rejected: {}", err);
                Self::forbidden("self_management", err.to_string())
            }
            InternalError::Authorization(AuthorizationError::InsufficientRole { .. }) => {
                tracing::warn!("Insufficient role: {}", err);
                Self::forbidden("insufficient_role", err.to_string())
            }

            InternalError::User(UserError::NotFound { .. })
            | InternalError::Asset(AssetError::NotFound { .. }) => Self::not_found(err.to_string()),

            InternalError::User(UserError::DuplicateEmail { .. }) => {
                Self::conflict("duplicate_email", "Email is already registered")
            }
            InternalError::Asset(AssetError::DuplicateSerialNumber { .. }) => {
                Self::conflict("duplicate_serial_number", "Serial number is already registered")
            }
            InternalError::Asset(AssetError::Retired { .. }) => {
                Self::conflict("asset_retired", err.to_string())
            }

            InternalError::Asset(AssetError::CustodianNotFound { .. })
            | InternalError::Validation { .. } => Self::bad_request(err.to_string()),

            // Already handled by the is_infrastructure() guard above
            InternalError::Database(_)
            | InternalError::Parse { .. }
            | InternalError::Crypto { .. }
            | InternalError::Audit(_) => Self::internal_server_error(),
        }
    }

    fn internal_server_error() -> Self {
        ManagementError::InternalError(Self::body(
            "internal_error",
            "An internal error occurred",
            500,
        ))
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        match self {
            ManagementError::Unauthenticated(json)
            | ManagementError::Forbidden(json)
            | ManagementError::NotFound(json)
            | ManagementError::Conflict(json)
            | ManagementError::BadRequest(json)
            | ManagementError::InternalError(json) => json.0.message.clone(),
        }
    }

    /// HTTP status carried by the variant
    pub fn status_code(&self) -> u16 {
        match self {
            ManagementError::Unauthenticated(json)
            | ManagementError::Forbidden(json)
            | ManagementError::NotFound(json)
            | ManagementError::Conflict(json)
            | ManagementError::BadRequest(json)
            | ManagementError::InternalError(json) => json.0.status_code,
        }
    }
}

impl fmt::Display for ManagementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl From<InternalError> for ManagementError {
    fn from(err: InternalError) -> Self {
        Self::from_internal_error(err)
    }
}
