use std::fmt;

/// Invalid or unparsable configuration value
#[derive(Debug)]
pub enum ConfigError {
    InvalidFormat {
        setting_name: String,
        expected: String,
        actual: String,
    },
    OutOfRange {
        setting_name: String,
        reason: String,
    },
}

impl ConfigError {
    pub fn invalid_format(setting_name: &str, expected: &str, actual: &str) -> Self {
        Self::InvalidFormat {
            setting_name: setting_name.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn out_of_range(setting_name: &str, reason: impl Into<String>) -> Self {
        Self::OutOfRange {
            setting_name: setting_name.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat {
                setting_name,
                expected,
                actual,
            } => write!(
                f,
                "Setting '{}' has invalid format. Expected: {}, got: {}",
                setting_name, expected, actual
            ),
            Self::OutOfRange {
                setting_name,
                reason,
            } => write!(f, "Invalid setting '{}': {}", setting_name, reason),
        }
    }
}

impl std::error::Error for ConfigError {}
