use std::fmt;

use crate::config::{EnvironmentProvider, SystemEnvironment};

/// Custom error type for secret-related failures
#[derive(Debug)]
pub enum SecretError {
    Missing { secret_name: String },
    InvalidLength { secret_name: String, expected: usize, actual: usize },
}

impl SecretError {
    pub fn missing(secret_name: &str) -> Self {
        Self::Missing {
            secret_name: secret_name.to_string(),
        }
    }

    pub fn invalid_length(secret_name: &str, expected: usize, actual: usize) -> Self {
        Self::InvalidLength {
            secret_name: secret_name.to_string(),
            expected,
            actual,
        }
    }
}

impl fmt::Display for SecretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { secret_name } => {
                write!(f, "Required secret '{}' is missing", secret_name)
            }
            Self::InvalidLength { secret_name, expected, actual } => {
                write!(
                    f,
                    "Secret '{}' must be at least {} characters, got {}",
                    secret_name, expected, actual
                )
            }
        }
    }
}

impl std::error::Error for SecretError {}

/// Name and minimum length of one required secret
struct SecretSpec {
    name: &'static str,
    min_length: usize,
}

const JWT_SECRET: SecretSpec = SecretSpec {
    name: "JWT_SECRET",
    min_length: 32,
};

const PASSWORD_PEPPER: SecretSpec = SecretSpec {
    name: "PASSWORD_PEPPER",
    min_length: 16,
};

const REFRESH_TOKEN_SECRET: SecretSpec = SecretSpec {
    name: "REFRESH_TOKEN_SECRET",
    min_length: 32,
};

/// Centralized manager for application secrets
pub struct SecretManager {
    jwt_secret: String,
    password_pepper: String,
    refresh_token_secret: String,
}

impl SecretManager {
    /// Load and validate all secrets from the process environment
    ///
    /// # Errors
    /// Returns `SecretError` if any required secret is missing or fails validation
    pub fn init() -> Result<Self, SecretError> {
        Self::from_env_provider(&SystemEnvironment)
    }

    /// Load and validate all secrets from the given environment provider
    ///
    /// # Errors
    /// Returns `SecretError` if any required secret is missing or fails validation
    pub fn from_env_provider(env: &dyn EnvironmentProvider) -> Result<Self, SecretError> {
        Ok(Self {
            jwt_secret: Self::load_secret(env, &JWT_SECRET)?,
            password_pepper: Self::load_secret(env, &PASSWORD_PEPPER)?,
            refresh_token_secret: Self::load_secret(env, &REFRESH_TOKEN_SECRET)?,
        })
    }

    /// Get the JWT signing secret
    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    /// Get the pepper for password hashing
    pub fn password_pepper(&self) -> &str {
        &self.password_pepper
    }

    /// Get the HMAC key for refresh token hashing
    pub fn refresh_token_secret(&self) -> &str {
        &self.refresh_token_secret
    }

    fn load_secret(env: &dyn EnvironmentProvider, spec: &SecretSpec) -> Result<String, SecretError> {
        let value = env
            .get_var(spec.name)
            .ok_or_else(|| SecretError::missing(spec.name))?;

        if value.len() < spec.min_length {
            return Err(SecretError::invalid_length(
                spec.name,
                spec.min_length,
                value.len(),
            ));
        }

        Ok(value)
    }
}

impl fmt::Debug for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretManager")
            .field("jwt_secret", &"<redacted>")
            .field("password_pepper", &"<redacted>")
            .field("refresh_token_secret", &"<redacted>")
            .finish()
    }
}

impl fmt::Display for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretManager {{ secrets_loaded: 3 }}")
    }
}
