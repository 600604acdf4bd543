//! Token issuance and redemption.

use crate::error::TokenError;
use chrono::{DateTime, Duration, Utc};
use sealtok_backend::{SealError, SealingBackend};
use sealtok_core::{Clock, ConfigError, SystemClock, Token, TokenConfig};
use tracing::debug;

/// When an issued token expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Relative to the issuer's clock at issue time.
    Lifetime(Duration),
    /// An absolute instant (past instants are allowed).
    At(DateTime<Utc>),
}

impl From<Duration> for Expiry {
    fn from(lifetime: Duration) -> Self {
        Expiry::Lifetime(lifetime)
    }
}

impl From<DateTime<Utc>> for Expiry {
    fn from(instant: DateTime<Utc>) -> Self {
        Expiry::At(instant)
    }
}

/// Limits enforced at issue time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuePolicy {
    /// Longest lifetime a token may be issued with.
    pub max_lifetime: Option<Duration>,
    /// Largest payload, in bytes.
    pub max_payload_size: Option<usize>,
}

impl IssuePolicy {
    /// Build the policy described by a [`TokenConfig`].
    pub fn from_config(config: &TokenConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            max_lifetime: config.max_lifetime()?,
            max_payload_size: config.max_payload_size,
        })
    }

    fn check(&self, now: DateTime<Utc>, token: &Token) -> Result<(), TokenError> {
        if let Some(max) = self.max_payload_size {
            if token.payload().len() > max {
                return Err(TokenError::InvalidInput(format!(
                    "payload is {} bytes, limit is {max}",
                    token.payload().len()
                )));
            }
        }

        if let Some(max) = self.max_lifetime {
            let lifetime = token.expiration_timestamp().saturating_sub(now.timestamp_millis());
            if lifetime > max.num_milliseconds() {
                return Err(TokenError::InvalidInput(format!(
                    "requested lifetime of {lifetime} ms exceeds limit of {} ms",
                    max.num_milliseconds()
                )));
            }
        }

        Ok(())
    }
}

/// A backend value bound to a clock and an issue policy.
///
/// ```ignore
/// let service = TokenService::new(Symmetric);
/// let wire = service.issue(&key, Duration::minutes(5), Some(b"user:42".as_slice()), None)?;
/// let token = service.redeem(&key, &wire, None)?;
/// ```
#[derive(Debug, Clone)]
pub struct TokenService<B, C = SystemClock> {
    backend: B,
    clock: C,
    policy: IssuePolicy,
}

impl<B: SealingBackend> TokenService<B> {
    /// Create a service on the system clock with no issue limits.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            clock: SystemClock,
            policy: IssuePolicy::default(),
        }
    }
}

impl<B: SealingBackend, C: Clock> TokenService<B, C> {
    /// Replace the clock.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> TokenService<B, C2> {
        TokenService {
            backend: self.backend,
            clock,
            policy: self.policy,
        }
    }

    /// Replace the issue policy.
    pub fn with_policy(mut self, policy: IssuePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The issue policy in force.
    pub fn policy(&self) -> &IssuePolicy {
        &self.policy
    }

    /// Build, encode and seal a token.
    pub fn issue(
        &self,
        key: &B::SealKey,
        expiry: impl Into<Expiry>,
        payload: Option<&[u8]>,
        associated_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, TokenError> {
        issue_with(
            &self.backend,
            &self.clock,
            &self.policy,
            key,
            expiry.into(),
            payload,
            associated_data,
        )
    }

    /// Open, decode and expiry-check a token.
    pub fn redeem(
        &self,
        key: &B::OpenKey,
        wire: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<Token, TokenError> {
        redeem_with(&self.backend, &self.clock, key, wire, associated_data)
    }
}

/// Issue a token on the system clock with no issue limits.
pub fn issue<B: SealingBackend>(
    backend: &B,
    key: &B::SealKey,
    expiry: impl Into<Expiry>,
    payload: Option<&[u8]>,
    associated_data: Option<&[u8]>,
) -> Result<Vec<u8>, TokenError> {
    issue_with(
        backend,
        &SystemClock,
        &IssuePolicy::default(),
        key,
        expiry.into(),
        payload,
        associated_data,
    )
}

/// Redeem a token against the system clock.
pub fn redeem<B: SealingBackend>(
    backend: &B,
    key: &B::OpenKey,
    wire: &[u8],
    associated_data: Option<&[u8]>,
) -> Result<Token, TokenError> {
    redeem_with(backend, &SystemClock, key, wire, associated_data)
}

fn issue_with<B: SealingBackend, C: Clock>(
    backend: &B,
    clock: &C,
    policy: &IssuePolicy,
    key: &B::SealKey,
    expiry: Expiry,
    payload: Option<&[u8]>,
    associated_data: Option<&[u8]>,
) -> Result<Vec<u8>, TokenError> {
    let now = clock.now();
    let token = match expiry {
        Expiry::Lifetime(lifetime) => Token::from_duration_at(now, lifetime, payload)
            .map_err(|e| TokenError::InvalidInput(e.to_string()))?,
        Expiry::At(instant) => Token::from_time(instant, payload),
    };
    policy.check(now, &token)?;

    let plaintext = token
        .encode()
        .map_err(|e| TokenError::Encoding(e.to_string()))?;
    let wire = backend.seal(key, &plaintext, associated_data.unwrap_or_default())?;

    debug!(
        backend = B::NAME,
        expires_at = token.expiration_timestamp(),
        payload_len = token.payload().len(),
        wire_len = wire.len(),
        "issued token"
    );
    Ok(wire)
}

fn redeem_with<B: SealingBackend, C: Clock>(
    backend: &B,
    clock: &C,
    key: &B::OpenKey,
    wire: &[u8],
    associated_data: Option<&[u8]>,
) -> Result<Token, TokenError> {
    let plaintext = match backend.open(key, wire, associated_data.unwrap_or_default()) {
        Ok(plaintext) => plaintext,
        Err(SealError::Authentication) => {
            debug!(backend = B::NAME, wire_len = wire.len(), "token rejected: authentication");
            return Err(TokenError::Authentication);
        }
        Err(other) => return Err(TokenError::Backend(other)),
    };

    let token = Token::decode(&plaintext).map_err(|e| {
        debug!(backend = B::NAME, "token rejected: malformed plaintext");
        TokenError::MalformedToken(e.to_string())
    })?;

    if token.is_expired(clock.now()) {
        debug!(
            backend = B::NAME,
            expires_at = token.expiration_timestamp(),
            "token rejected: expired"
        );
        return Err(TokenError::expired(token));
    }

    debug!(
        backend = B::NAME,
        expires_at = token.expiration_timestamp(),
        "token redeemed"
    );
    Ok(token)
}
