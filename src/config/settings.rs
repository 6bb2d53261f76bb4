use std::fmt;
use std::str::FromStr;

use crate::config::{ConfigError, EnvironmentProvider};

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Settings {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for Argon2Settings {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Non-secret runtime settings
///
/// Loaded once at startup. Secrets live in [`crate::config::SecretManager`].
#[derive(Clone, PartialEq)]
pub struct Settings {
    database_url: String,
    audit_database_url: String,
    server_host: String,
    server_port: u16,
    access_token_ttl_minutes: i64,
    refresh_token_ttl_days: i64,
    argon2: Argon2Settings,
}

impl Settings {
    /// Load settings from the given environment provider, applying defaults
    ///
    /// # Errors
    /// Returns `ConfigError` when a value is present but cannot be parsed or is out of range
    pub fn from_env_provider(env: &dyn EnvironmentProvider) -> Result<Self, ConfigError> {
        let database_url = env.get_var_or("DATABASE_URL", "sqlite://maintrack.db?mode=rwc");
        let audit_database_url =
            env.get_var_or("AUDIT_DATABASE_URL", "sqlite://maintrack-audit.db?mode=rwc");
        let server_host = env.get_var_or("HOST", "0.0.0.0");

        let server_port: u16 = parse_setting(env, "PORT", "3000", "port number 1-65535")?;
        if server_port == 0 {
            return Err(ConfigError::out_of_range("PORT", "must be between 1 and 65535"));
        }

        let access_token_ttl_minutes =
            parse_positive(env, "ACCESS_TOKEN_TTL_MINUTES", "15")?;
        let refresh_token_ttl_days = parse_positive(env, "REFRESH_TOKEN_TTL_DAYS", "7")?;

        let defaults = Argon2Settings::default();
        let argon2 = Argon2Settings {
            memory_kib: parse_setting(
                env,
                "ARGON2_MEMORY_KIB",
                &defaults.memory_kib.to_string(),
                "unsigned integer",
            )?,
            iterations: parse_setting(
                env,
                "ARGON2_ITERATIONS",
                &defaults.iterations.to_string(),
                "unsigned integer",
            )?,
            parallelism: parse_setting(
                env,
                "ARGON2_PARALLELISM",
                &defaults.parallelism.to_string(),
                "unsigned integer",
            )?,
        };

        Ok(Self {
            database_url,
            audit_database_url,
            server_host,
            server_port,
            access_token_ttl_minutes,
            refresh_token_ttl_days,
            argon2,
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn audit_database_url(&self) -> &str {
        &self.audit_database_url
    }

    pub fn server_host(&self) -> &str {
        &self.server_host
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Access token lifetime in seconds
    pub fn access_token_ttl_seconds(&self) -> i64 {
        self.access_token_ttl_minutes * 60
    }

    /// Refresh token lifetime in seconds
    pub fn refresh_token_ttl_seconds(&self) -> i64 {
        self.refresh_token_ttl_days * 24 * 60 * 60
    }

    pub fn argon2(&self) -> Argon2Settings {
        self.argon2
    }

    /// Point both databases elsewhere, keeping every other value
    pub fn with_database_urls(mut self, database_url: &str, audit_database_url: &str) -> Self {
        self.database_url = database_url.to_string();
        self.audit_database_url = audit_database_url.to_string();
        self
    }

    /// Use different Argon2 cost parameters
    pub fn with_argon2(mut self, argon2: Argon2Settings) -> Self {
        self.argon2 = argon2;
        self
    }
}

fn parse_setting<T: FromStr>(
    env: &dyn EnvironmentProvider,
    name: &str,
    default: &str,
    expected: &str,
) -> Result<T, ConfigError> {
    let raw = env.get_var_or(name, default);
    raw.parse::<T>()
        .map_err(|_| ConfigError::invalid_format(name, expected, &raw))
}

fn parse_positive(
    env: &dyn EnvironmentProvider,
    name: &str,
    default: &str,
) -> Result<i64, ConfigError> {
    let value: i64 = parse_setting(env, name, default, "positive integer")?;
    if value <= 0 {
        return Err(ConfigError::out_of_range(name, "must be greater than zero"));
    }
    Ok(value)
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("database_url", &self.database_url)
            .field("audit_database_url", &self.audit_database_url)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("access_token_ttl_minutes", &self.access_token_ttl_minutes)
            .field("refresh_token_ttl_days", &self.refresh_token_ttl_days)
            .field("argon2", &self.argon2)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MockEnvironment;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::from_env_provider(&MockEnvironment::empty()).unwrap();

        assert_eq!(settings.database_url(), "sqlite://maintrack.db?mode=rwc");
        assert_eq!(
            settings.audit_database_url(),
            "sqlite://maintrack-audit.db?mode=rwc"
        );
        assert_eq!(settings.server_address(), "0.0.0.0:3000");
        assert_eq!(settings.access_token_ttl_seconds(), 15 * 60);
        assert_eq!(settings.refresh_token_ttl_seconds(), 7 * 24 * 60 * 60);
        assert_eq!(settings.argon2(), Argon2Settings::default());
    }

    #[test]
    fn test_settings_from_environment() {
        let env = MockEnvironment::empty().with_vars(&[
            ("DATABASE_URL", "sqlite://test.db"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("ACCESS_TOKEN_TTL_MINUTES", "5"),
            ("REFRESH_TOKEN_TTL_DAYS", "30"),
            ("ARGON2_MEMORY_KIB", "8"),
        ]);
        let settings = Settings::from_env_provider(&env).unwrap();

        assert_eq!(settings.database_url(), "sqlite://test.db");
        assert_eq!(settings.server_address(), "127.0.0.1:8080");
        assert_eq!(settings.access_token_ttl_seconds(), 300);
        assert_eq!(settings.refresh_token_ttl_seconds(), 30 * 86_400);
        assert_eq!(settings.argon2().memory_kib, 8);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let env = MockEnvironment::empty().with_var("PORT", "not-a-port");
        let err = Settings::from_env_provider(&env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFormat { .. }));

        let env = MockEnvironment::empty().with_var("PORT", "0");
        assert!(Settings::from_env_provider(&env).is_err());
    }

    #[test]
    fn test_non_positive_ttl_is_rejected() {
        let env = MockEnvironment::empty().with_var("REFRESH_TOKEN_TTL_DAYS", "0");
        let err = Settings::from_env_provider(&env).unwrap_err();
        assert!(err.to_string().contains("REFRESH_TOKEN_TTL_DAYS"));
    }
}
