//! Configuration for token issuance and verification.
//!
//! Loaded from a YAML file (conventionally `sealtok.yaml`):
//!
//! ```yaml
//! backend: symmetric
//! default_lifetime: 15m
//! max_lifetime: 24h
//! max_payload_size: 4096
//! keys:
//!   seal_key_env: SEALTOK_SEAL_KEY
//!   open_key_file: keys/open.key
//! ```

use crate::error::ConfigError;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which sealing backend a deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Shared secret, ChaCha20-Poly1305.
    #[default]
    Symmetric,
    /// Anonymous sender, X25519 key agreement to a recipient public key.
    SealedBox,
    /// Ed25519-signed by the sender, then sealed to the recipient.
    SignedBox,
}

impl BackendKind {
    /// Stable name used in config files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Symmetric => "symmetric",
            BackendKind::SealedBox => "sealed_box",
            BackendKind::SignedBox => "signed_box",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "symmetric" => Ok(BackendKind::Symmetric),
            "sealed_box" => Ok(BackendKind::SealedBox),
            "signed_box" => Ok(BackendKind::SignedBox),
            other => Err(format!(
                "unknown backend '{other}' (expected symmetric, sealed_box or signed_box)"
            )),
        }
    }
}

/// Token settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Sealing backend.
    #[serde(default)]
    pub backend: BackendKind,

    /// Lifetime applied when the caller does not give one (e.g., "15m").
    #[serde(default = "default_lifetime")]
    pub default_lifetime: String,

    /// Upper bound on requested lifetimes (e.g., "24h").
    #[serde(default)]
    pub max_lifetime: Option<String>,

    /// Upper bound on payload size in bytes.
    #[serde(default)]
    pub max_payload_size: Option<usize>,

    /// Where key material comes from.
    #[serde(default)]
    pub keys: KeyConfig,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            default_lifetime: default_lifetime(),
            max_lifetime: None,
            max_payload_size: None,
            keys: KeyConfig::default(),
        }
    }
}

impl TokenConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        // Surface bad durations at load time rather than at first issue.
        config.default_lifetime()?;
        config.max_lifetime()?;
        Ok(config)
    }

    /// Parsed `default_lifetime`.
    pub fn default_lifetime(&self) -> Result<Duration, ConfigError> {
        parse_duration("default_lifetime", &self.default_lifetime)
    }

    /// Parsed `max_lifetime`, if set.
    pub fn max_lifetime(&self) -> Result<Option<Duration>, ConfigError> {
        self.max_lifetime
            .as_deref()
            .map(|s| parse_duration("max_lifetime", s))
            .transpose()
    }
}

/// Key material sources. Each role is looked up in its environment variable
/// first, then in its file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KeyConfig {
    /// Environment variable holding the hex-encoded sealing key.
    #[serde(default)]
    pub seal_key_env: Option<String>,

    /// File holding the hex-encoded sealing key.
    #[serde(default)]
    pub seal_key_file: Option<PathBuf>,

    /// Environment variable holding the hex-encoded opening key.
    #[serde(default)]
    pub open_key_env: Option<String>,

    /// File holding the hex-encoded opening key.
    #[serde(default)]
    pub open_key_file: Option<PathBuf>,
}

impl KeyConfig {
    /// Resolve the sealing key from environment or file.
    pub fn resolve_seal_key(&self) -> Result<Option<String>, std::io::Error> {
        resolve(self.seal_key_env.as_deref(), self.seal_key_file.as_deref())
    }

    /// Resolve the opening key from environment or file.
    pub fn resolve_open_key(&self) -> Result<Option<String>, std::io::Error> {
        resolve(self.open_key_env.as_deref(), self.open_key_file.as_deref())
    }

    /// Like [`KeyConfig::resolve_seal_key`] but a missing key is an error.
    pub fn require_seal_key(&self) -> Result<String, ConfigError> {
        self.resolve_seal_key()?
            .ok_or(ConfigError::MissingKey { role: "seal" })
    }

    /// Like [`KeyConfig::resolve_open_key`] but a missing key is an error.
    pub fn require_open_key(&self) -> Result<String, ConfigError> {
        self.resolve_open_key()?
            .ok_or(ConfigError::MissingKey { role: "open" })
    }
}

fn resolve(env_var: Option<&str>, file: Option<&Path>) -> Result<Option<String>, std::io::Error> {
    if let Some(env_var) = env_var {
        if let Ok(key) = std::env::var(env_var) {
            return Ok(Some(key.trim().to_string()));
        }
    }

    if let Some(path) = file {
        if path.exists() {
            let key = std::fs::read_to_string(path)?;
            return Ok(Some(key.trim().to_string()));
        }
    }

    Ok(None)
}

/// Parse a human-readable duration such as "15m", "1h 30m" or "100ms".
pub fn parse_duration(field: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let std_duration =
        humantime::parse_duration(value.trim()).map_err(|e| ConfigError::InvalidDuration {
            field,
            reason: e.to_string(),
        })?;
    Duration::from_std(std_duration).map_err(|e| ConfigError::InvalidDuration {
        field,
        reason: e.to_string(),
    })
}

fn default_lifetime() -> String {
    "15m".to_string()
}
