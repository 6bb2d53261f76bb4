use std::fmt;
use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::prelude::*;
use uuid::Uuid;

use crate::config::SecretManager;
use crate::errors::InternalError;
use crate::errors::internal::CredentialError;
use crate::providers::{Clock, CryptoProvider};
use crate::types::internal::auth::Claims;
use crate::types::internal::user::User;

/// Provides access token signing and validation plus refresh token operations
///
/// Access tokens are stateless HS256 JWTs. Refresh tokens are opaque random
/// strings; only their HMAC-SHA256 hash is ever stored.
pub struct TokenProvider {
    secret_manager: Arc<SecretManager>,
    crypto: Arc<CryptoProvider>,
    clock: Arc<dyn Clock>,
    access_token_ttl_seconds: i64,
    refresh_token_ttl_seconds: i64,
}

impl TokenProvider {
    /// Create a new TokenProvider
    ///
    /// # Arguments
    /// * `secret_manager` - Source of the JWT and refresh token secrets
    /// * `crypto` - HMAC implementation for refresh token hashing
    /// * `clock` - Time source for `iat`, `exp` and expiry checks
    /// * `access_token_ttl_seconds` - Access token lifetime
    /// * `refresh_token_ttl_seconds` - Refresh token lifetime
    pub fn new(
        secret_manager: Arc<SecretManager>,
        crypto: Arc<CryptoProvider>,
        clock: Arc<dyn Clock>,
        access_token_ttl_seconds: i64,
        refresh_token_ttl_seconds: i64,
    ) -> Self {
        Self {
            secret_manager,
            crypto,
            clock,
            access_token_ttl_seconds,
            refresh_token_ttl_seconds,
        }
    }

    pub fn access_token_ttl_seconds(&self) -> i64 {
        self.access_token_ttl_seconds
    }

    /// Sign an access token carrying the user's current email and role
    ///
    /// # Returns
    /// * `Ok((token, claims))` - Encoded JWT and the claims inside it
    /// * `Err(InternalError::Crypto)` - Signing failed
    pub fn generate_access_token(&self, user: &User) -> Result<(String, Claims), InternalError> {
        let now = self.clock.now();
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            exp: now + self.access_token_ttl_seconds,
            iat: now,
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret_manager.jwt_secret().as_bytes()),
        )
        .map_err(|e| InternalError::crypto("jwt_generation", format!("Failed to generate JWT: {}", e)))?;

        Ok((token, claims))
    }

    /// Validate an access token and return its claims
    ///
    /// The signature is checked by `jsonwebtoken`; expiry is checked against the
    /// injected clock. A token is expired once `now >= exp`.
    ///
    /// # Returns
    /// * `Ok(Claims)` - Valid, unexpired token
    /// * `Err(CredentialError::ExpiredToken("jwt"))` - Signature valid but expired
    /// * `Err(CredentialError::InvalidToken)` - Bad signature, malformed, or unknown role
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, InternalError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret_manager.jwt_secret().as_bytes()),
            &validation,
        )
        .map_err(|e| {
            tracing::debug!("Access token rejected: {}", e);
            InternalError::from(CredentialError::invalid_token(
                "jwt",
                "invalid signature or malformed",
            ))
        })?
        .claims;

        if self.clock.now() >= claims.exp {
            return Err(CredentialError::ExpiredToken("jwt".to_string()).into());
        }

        Ok(claims)
    }

    /// Generate a cryptographically secure refresh token
    ///
    /// # Returns
    /// * `String` - 32 random bytes, base64url without padding
    pub fn generate_refresh_token(&self) -> String {
        let mut rng = rand::rng();
        let random_bytes: [u8; 32] = rng.random();
        general_purpose::URL_SAFE_NO_PAD.encode(random_bytes)
    }

    /// Hash a refresh token using HMAC-SHA256 keyed with the refresh token secret
    pub fn hash_refresh_token(&self, token: &str) -> Result<String, InternalError> {
        self.crypto
            .hmac_sha256_token(self.secret_manager.refresh_token_secret(), token)
    }

    /// Expiration timestamp for a refresh token issued now
    pub fn refresh_expiration(&self) -> i64 {
        self.clock.now() + self.refresh_token_ttl_seconds
    }
}

impl fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenProvider")
            .field("secret_manager", &"<redacted>")
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("refresh_token_ttl_seconds", &self.refresh_token_ttl_seconds)
            .finish()
    }
}

impl fmt::Display for TokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TokenProvider {{ access_ttl: {}s, refresh_ttl: {}s }}",
            self.access_token_ttl_seconds, self.refresh_token_ttl_seconds
        )
    }
}
