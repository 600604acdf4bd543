//! Error types for sealing backends.

use thiserror::Error;

/// Errors that can occur while sealing or opening.
#[derive(Debug, Error)]
pub enum SealError {
    /// Ciphertext did not authenticate. Deliberately carries no detail:
    /// short input, bad tag, wrong key and wrong associated data all map here.
    #[error("authentication failed")]
    Authentication,

    /// The OS random source failed.
    #[error("random source unavailable: {0}")]
    Randomness(String),

    /// Key material has the wrong size or encoding.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The cipher refused to encrypt (e.g., message too large).
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// IO error (reading/writing keys).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
