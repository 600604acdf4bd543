//! Error types for the core crate.

use thiserror::Error;

/// Errors raised while building, encoding or decoding a token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Plaintext is shorter than the fixed timestamp field.
    #[error("token plaintext too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    /// Buffer allocation for the encoded token failed.
    #[error("failed to allocate token buffer: {0}")]
    Allocation(String),

    /// `now + lifetime` does not fit in a millisecond timestamp.
    #[error("token expiry overflows the supported time range")]
    ExpiryOverflow,
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error (reading config or key files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error.
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A duration field could not be parsed.
    #[error("invalid duration for {field}: {reason}")]
    InvalidDuration { field: &'static str, reason: String },

    /// No key was found in the configured environment variable or file.
    #[error("no {role} key configured (checked env var and file)")]
    MissingKey { role: &'static str },
}
