//! Error types for token issuance and redemption.

use chrono::DateTime;
use sealtok_backend::SealError;
use sealtok_core::Token;
use thiserror::Error;

/// Errors returned by [`crate::issue`] and [`crate::redeem`].
#[derive(Debug, Error)]
pub enum TokenError {
    /// The caller's request was malformed or exceeded policy limits.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Encoding a well-formed token failed.
    #[error("failed to encode token: {0}")]
    Encoding(String),

    /// The token did not authenticate under the given key and associated data.
    #[error("unable to decrypt token")]
    Authentication,

    /// The token authenticated but its plaintext is not a valid token layout.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// The token is authentic but its expiration instant has passed.
    ///
    /// The decoded token is carried for inspection only; it must not be used
    /// for authorization.
    #[error("token expired at {}", format_instant(.expired_at))]
    Expired {
        /// Expiration instant, milliseconds since the Unix epoch.
        expired_at: i64,
        token: Box<Token>,
    },

    /// The sealing backend failed (randomness, key or cipher error).
    #[error("sealing backend error: {0}")]
    Backend(#[from] SealError),
}

impl TokenError {
    pub(crate) fn expired(token: Token) -> Self {
        TokenError::Expired {
            expired_at: token.expiration_timestamp(),
            token: Box::new(token),
        }
    }

    /// Whether a caller may recover, e.g. by requesting a fresh token.
    ///
    /// Authentication and malformed-token failures are facts about the input;
    /// retrying with the same input cannot change them.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TokenError::Expired { .. })
    }

    /// The decoded token of an expired redeem.
    pub fn expired_token(&self) -> Option<&Token> {
        match self {
            TokenError::Expired { token, .. } => Some(token.as_ref()),
            _ => None,
        }
    }

    /// Consume the error, returning the decoded token of an expired redeem.
    pub fn into_expired_token(self) -> Option<Token> {
        match self {
            TokenError::Expired { token, .. } => Some(*token),
            _ => None,
        }
    }
}

fn format_instant(millis: &i64) -> String {
    DateTime::from_timestamp_millis(*millis)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| format!("{millis} ms since epoch"))
}
