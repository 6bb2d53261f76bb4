use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use crate::config::Argon2Settings;
use crate::errors::InternalError;

type HmacSha256 = Hmac<Sha256>;

/// Cryptographic operations provider
///
/// Argon2id password hashing with a server-side pepper, HMAC-SHA256 for
/// refresh token storage and secure password generation.
pub struct CryptoProvider {
    password_pepper: String,
    params: Argon2Settings,
}

impl CryptoProvider {
    /// Create a new CryptoProvider
    ///
    /// # Arguments
    /// * `password_pepper` - Secret mixed into every password hash (from SecretManager)
    /// * `params` - Argon2id cost parameters
    pub fn new(password_pepper: impl Into<String>, params: Argon2Settings) -> Self {
        Self {
            password_pepper: password_pepper.into(),
            params,
        }
    }

    fn argon2(&self) -> Result<Argon2<'_>, InternalError> {
        let params = Params::new(
            self.params.memory_kib,
            self.params.iterations,
            self.params.parallelism,
            None,
        )
        .map_err(|e| InternalError::crypto("argon2_params", e.to_string()))?;

        Argon2::new_with_secret(
            self.password_pepper.as_bytes(),
            Algorithm::Argon2id,
            Version::V0x13,
            params,
        )
        .map_err(|e| InternalError::crypto("argon2_init", e.to_string()))
    }

    /// Hash a password with Argon2id and a fresh random salt
    ///
    /// # Returns
    /// PHC string (`$argon2id$...`)
    pub fn hash_password(&self, password: &str) -> Result<String, InternalError> {
        let salt = SaltString::generate(&mut rand_core::OsRng);
        let hash = self
            .argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| InternalError::crypto("password_hash", e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored PHC hash
    ///
    /// Cost parameters are read from the stored hash, so hashes made with older
    /// settings still verify.
    ///
    /// # Returns
    /// * `Ok(true)` - Password matches
    /// * `Ok(false)` - Password does not match
    /// * `Err(InternalError)` - Stored hash is unreadable
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, InternalError> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| InternalError::parse("password_hash", e.to_string()))?;

        Ok(self
            .argon2()?
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Spend one Argon2 computation on a password that has no stored hash
    ///
    /// Login calls this when no account matches the email so that both
    /// rejection paths cost the same. Always reports a mismatch.
    pub fn verify_without_account(&self, password: &str) -> Result<bool, InternalError> {
        self.hash_password(password)?;
        Ok(false)
    }

    /// Compute HMAC-SHA256 for refresh tokens and return as hexadecimal string
    ///
    /// # Arguments
    /// * `key` - The secret key for HMAC computation
    /// * `token` - The token to hash
    pub fn hmac_sha256_token(&self, key: &str, token: &str) -> Result<String, InternalError> {
        let mut mac = HmacSha256::new_from_slice(key.as_bytes())
            .map_err(|e| InternalError::crypto("hmac_init", e.to_string()))?;
        mac.update(token.as_bytes());
        Ok(format!("{:x}", mac.finalize().into_bytes()))
    }

    /// Generate a cryptographically secure random password
    ///
    /// 20 characters drawn from upper and lower case letters, digits and symbols.
    pub fn generate_secure_password(&self) -> String {
        const PASSWORD_LENGTH: usize = 20;
        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                                 abcdefghijklmnopqrstuvwxyz\
                                 0123456789\
                                 !@#$%^&*()_+-=[]{}|;:,.<>?";

        let mut rng = rand::rng();
        (0..PASSWORD_LENGTH)
            .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
            .collect()
    }
}

impl fmt::Debug for CryptoProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoProvider")
            .field("password_pepper", &"<redacted>")
            .field("params", &self.params)
            .finish()
    }
}
