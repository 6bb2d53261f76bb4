use crate::errors::internal::{AuthorizationError, CredentialError, InternalError, UserError};
use poem_openapi::{ApiResponse, Object, payload::Json};
use std::fmt;

/// Standardized error response for authentication endpoints
#[derive(Object, Debug)]
pub struct AuthErrorResponse {
    /// Error code identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code
    pub status_code: u16,
}

/// Authentication error types
#[derive(ApiResponse, Debug)]
pub enum AuthError {
    /// Invalid email or password
    #[oai(status = 401)]
    InvalidCredentials(Json<AuthErrorResponse>),

    /// Password was correct but the account is pending or rejected
    #[oai(status = 403)]
    AccountNotApproved(Json<AuthErrorResponse>),

    /// Request body failed validation
    #[oai(status = 400)]
    ValidationFailed(Json<AuthErrorResponse>),

    /// Email already registered
    #[oai(status = 409)]
    DuplicateEmail(Json<AuthErrorResponse>),

    /// Invalid or malformed JWT
    #[oai(status = 401)]
    InvalidToken(Json<AuthErrorResponse>),

    /// JWT has expired
    #[oai(status = 401)]
    ExpiredToken(Json<AuthErrorResponse>),

    /// Invalid refresh token
    #[oai(status = 401)]
    InvalidRefreshToken(Json<AuthErrorResponse>),

    /// Refresh token has expired
    #[oai(status = 401)]
    ExpiredRefreshToken(Json<AuthErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<AuthErrorResponse>),
}

impl AuthError {
    fn body(error: &str, message: impl Into<String>, status_code: u16) -> Json<AuthErrorResponse> {
        Json(AuthErrorResponse {
            error: error.to_string(),
            message: message.into(),
            status_code,
        })
    }

    /// Create an InvalidCredentials error
    pub fn invalid_credentials() -> Self {
        AuthError::InvalidCredentials(Self::body(
            "invalid_credentials",
            "Invalid email or password",
            401,
        ))
    }

    /// Create an AccountNotApproved error
    pub fn account_not_approved() -> Self {
        AuthError::AccountNotApproved(Self::body(
            "account_not_approved",
            "Account is awaiting approval",
            403,
        ))
    }

    /// Create a ValidationFailed error
    pub fn validation_failed(message: String) -> Self {
        AuthError::ValidationFailed(Self::body("validation_failed", message, 400))
    }

    /// Create a DuplicateEmail error
    pub fn duplicate_email() -> Self {
        AuthError::DuplicateEmail(Self::body(
            "duplicate_email",
            "Email is already registered",
            409,
        ))
    }

    /// Create an InvalidToken error
    pub fn invalid_token() -> Self {
        AuthError::InvalidToken(Self::body("invalid_token", "Invalid or malformed JWT", 401))
    }

    /// Create an ExpiredToken error
    pub fn expired_token() -> Self {
        AuthError::ExpiredToken(Self::body("expired_token", "JWT has expired", 401))
    }

    /// Create an InvalidRefreshToken error
    pub fn invalid_refresh_token() -> Self {
        AuthError::InvalidRefreshToken(Self::body(
            "invalid_refresh_token",
            "Invalid refresh token",
            401,
        ))
    }

    /// Create an ExpiredRefreshToken error
    pub fn expired_refresh_token() -> Self {
        AuthError::ExpiredRefreshToken(Self::body(
            "expired_refresh_token",
            "Refresh token has expired",
            401,
        ))
    }

    /// Convert InternalError to AuthError
    ///
    /// This is the explicit conversion point from internal errors to API errors.
    /// Internal error details are logged but not exposed to clients.
    pub fn from_internal_error(err: InternalError) -> Self {
        match &err {
            // Infrastructure errors - always log and return generic error
            _ if err.is_infrastructure() => {
                tracing::error!("Internal error in auth operation: {}", err);
                Self::internal_server_error()
            }

            // Domain errors - convert to specific API errors
            InternalError::Validation { message, .. } => {
                tracing::debug!("Validation failed: {}", err);
                Self::validation_failed(message.clone())
            }
            InternalError::Credential(CredentialError::InvalidCredentials) => {
                tracing::debug!("Invalid credentials attempt");
                Self::invalid_credentials()
            }
            InternalError::Credential(CredentialError::AccountNotApproved) => {
                tracing::debug!("Login attempt on unapproved account");
                Self::account_not_approved()
            }
            InternalError::User(UserError::DuplicateEmail { email }) => {
                tracing::warn!("Duplicate email registration attempt: {}", email);
                Self::duplicate_email()
            }
            InternalError::Credential(CredentialError::InvalidToken { token_type, reason }) => {
                tracing::debug!("Invalid token: {} - {}", token_type, reason);
                if token_type == "refresh_token" {
                    Self::invalid_refresh_token()
                } else {
                    Self::invalid_token()
                }
            }
            InternalError::Credential(CredentialError::ExpiredToken(token_type)) => {
                tracing::debug!("Expired token: {}", token_type);
                if token_type == "refresh_token" {
                    Self::expired_refresh_token()
                } else {
                    Self::expired_token()
                }
            }
            InternalError::Authorization(AuthorizationError::Unauthenticated) => {
                Self::invalid_token()
            }

            // Other domain errors that shouldn't appear in auth context
            _ => {
                tracing::error!("Unexpected error in auth operation: {}", err);
                Self::internal_server_error()
            }
        }
    }

    /// Create a generic internal server error
    ///
    /// Always returns a generic message without exposing internal details.
    fn internal_server_error() -> Self {
        AuthError::InternalError(Self::body(
            "internal_error",
            "An internal error occurred",
            500,
        ))
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        match self {
            AuthError::InvalidCredentials(json)
            | AuthError::AccountNotApproved(json)
            | AuthError::ValidationFailed(json)
            | AuthError::DuplicateEmail(json)
            | AuthError::InvalidToken(json)
            | AuthError::ExpiredToken(json)
            | AuthError::InvalidRefreshToken(json)
            | AuthError::ExpiredRefreshToken(json)
            | AuthError::InternalError(json) => json.0.message.clone(),
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl From<InternalError> for AuthError {
    fn from(err: InternalError) -> Self {
        Self::from_internal_error(err)
    }
}
