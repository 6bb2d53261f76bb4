use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredentialError {
    /// Unknown email and wrong password are deliberately indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is not approved")]
    AccountNotApproved,

    #[error("Password hashing failed: {0}")]
    PasswordHashingFailed(String),

    #[error("Invalid token: {token_type} - {reason}")]
    InvalidToken {
        token_type: String,
        reason: String,
    },

    #[error("Expired token: {0}")]
    ExpiredToken(String),
}

impl CredentialError {
    pub fn invalid_token(token_type: &str, reason: impl Into<String>) -> Self {
        CredentialError::InvalidToken {
            token_type: token_type.to_string(),
            reason: reason.into(),
        }
    }
}
