//! Logical token and its canonical binary encoding.

use crate::error::ModelError;
use chrono::{DateTime, Duration, Utc};

/// Width of the big-endian expiration timestamp that prefixes every plaintext.
pub const TIMESTAMP_SIZE: usize = 8;

/// An expiring token before sealing / after opening.
///
/// The expiration instant is fixed at construction; there are no setters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    /// Milliseconds since the Unix epoch.
    expiration_timestamp: i64,
    payload: Vec<u8>,
}

impl Token {
    /// Create a token that expires at `expires_at`.
    ///
    /// Any instant is accepted, including ones already in the past.
    pub fn from_time(expires_at: DateTime<Utc>, payload: Option<&[u8]>) -> Self {
        Self::from_timestamp_millis(expires_at.timestamp_millis(), payload)
    }

    /// Create a token that expires `lifetime` after the current wall-clock time.
    pub fn from_duration(lifetime: Duration, payload: Option<&[u8]>) -> Result<Self, ModelError> {
        Self::from_duration_at(Utc::now(), lifetime, payload)
    }

    /// Create a token that expires `lifetime` after `now`.
    pub fn from_duration_at(
        now: DateTime<Utc>,
        lifetime: Duration,
        payload: Option<&[u8]>,
    ) -> Result<Self, ModelError> {
        let expires_at = now
            .checked_add_signed(lifetime)
            .ok_or(ModelError::ExpiryOverflow)?;
        Ok(Self::from_time(expires_at, payload))
    }

    /// Create a token from a raw millisecond timestamp.
    pub fn from_timestamp_millis(expiration_timestamp: i64, payload: Option<&[u8]>) -> Self {
        Self {
            expiration_timestamp,
            payload: payload.map(<[u8]>::to_vec).unwrap_or_default(),
        }
    }

    /// Expiration instant in milliseconds since the Unix epoch.
    pub fn expiration_timestamp(&self) -> i64 {
        self.expiration_timestamp
    }

    /// Expiration instant as a `DateTime`.
    ///
    /// `None` when a decoded timestamp lies outside the range chrono can represent.
    pub fn expiration_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.expiration_timestamp)
    }

    /// The opaque payload (may be empty).
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Consume the token, returning its payload.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// True iff `now` is not strictly before the expiration instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() >= self.expiration_timestamp
    }

    /// Time left before expiry, `None` once expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        if self.is_expired(now) {
            return None;
        }
        let millis = self
            .expiration_timestamp
            .saturating_sub(now.timestamp_millis());
        Some(Duration::milliseconds(millis))
    }

    /// Size of the encoded plaintext.
    pub fn plaintext_size(&self) -> usize {
        TIMESTAMP_SIZE.saturating_add(self.payload.len())
    }

    /// Encode as `[8 bytes big-endian expiration][payload]`.
    pub fn encode(&self) -> Result<Vec<u8>, ModelError> {
        let mut out = Vec::new();
        out.try_reserve_exact(self.plaintext_size())
            .map_err(|e| ModelError::Allocation(e.to_string()))?;
        out.extend_from_slice(&self.expiration_timestamp.to_be_bytes());
        out.extend_from_slice(&self.payload);
        Ok(out)
    }

    /// Decode a plaintext produced by [`Token::encode`].
    ///
    /// Everything after the timestamp is taken verbatim as payload.
    pub fn decode(bytes: &[u8]) -> Result<Self, ModelError> {
        let (timestamp, payload) = bytes
            .split_first_chunk::<TIMESTAMP_SIZE>()
            .ok_or(ModelError::TooShort {
                expected: TIMESTAMP_SIZE,
                actual: bytes.len(),
            })?;

        Ok(Self {
            expiration_timestamp: i64::from_be_bytes(*timestamp),
            payload: payload.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    #[test]
    fn test_encode_layout() {
        let token = Token::from_timestamp_millis(0x0102_0304_0506_0708, Some(b"abc".as_slice()));
        let encoded = token.encode().unwrap();

        assert_eq!(encoded, vec![1, 2, 3, 4, 5, 6, 7, 8, b'a', b'b', b'c']);
        assert_eq!(encoded.len(), token.plaintext_size());
    }

    #[test]
    fn test_encode_negative_timestamp_is_twos_complement() {
        let token = Token::from_timestamp_millis(-1, None);
        assert_eq!(token.encode().unwrap(), vec![0xff; 8]);
    }

    #[test]
    fn test_decode_too_short() {
        let err = Token::decode(&[0u8; 7]).unwrap_err();
        assert_eq!(
            err,
            ModelError::TooShort {
                expected: 8,
                actual: 7
            }
        );
        assert!(Token::decode(&[]).is_err());
    }

    #[test]
    fn test_decode_empty_payload() {
        let token = Token::decode(&42i64.to_be_bytes()).unwrap();
        assert_eq!(token.expiration_timestamp(), 42);
        assert!(token.payload().is_empty());
    }

    #[test]
    fn test_decode_inverts_encode() {
        let big = vec![0xa5u8; 64 * 1024];
        let tokens = [
            Token::from_timestamp_millis(0, None),
            Token::from_timestamp_millis(i64::MIN, Some(b"min".as_slice())),
            Token::from_timestamp_millis(i64::MAX, Some(b"".as_slice())),
            Token::from_timestamp_millis(1_700_000_000_123, Some(big.as_slice())),
        ];

        for token in tokens {
            let decoded = Token::decode(&token.encode().unwrap()).unwrap();
            assert_eq!(decoded, token);
        }
    }

    #[test]
    fn test_no_payload_and_empty_payload_are_equal() {
        assert_eq!(
            Token::from_timestamp_millis(5, None),
            Token::from_timestamp_millis(5, Some(&[][..]))
        );
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let token = Token::from_timestamp_millis(1_000, None);

        assert!(!token.is_expired(at(999)));
        assert!(token.is_expired(at(1_000)));
        assert!(token.is_expired(at(1_001)));
    }

    #[test]
    fn test_from_duration_at() {
        let now = at(10_000);
        let token =
            Token::from_duration_at(now, Duration::milliseconds(100), Some(b"p".as_slice()))
                .unwrap();

        assert_eq!(token.expiration_timestamp(), 10_100);
        assert_eq!(token.payload(), b"p");
        assert_eq!(
            token.remaining(at(10_050)),
            Some(Duration::milliseconds(50))
        );
        assert_eq!(token.remaining(at(10_100)), None);
    }

    #[test]
    fn test_past_instant_is_accepted() {
        let token = Token::from_duration_at(at(10_000), Duration::seconds(-5), None).unwrap();
        assert!(token.is_expired(at(10_000)));
    }

    #[test]
    fn test_from_duration_overflow() {
        let err = Token::from_duration_at(DateTime::<Utc>::MAX_UTC, Duration::days(1), None)
            .unwrap_err();
        assert_eq!(err, ModelError::ExpiryOverflow);
    }

    #[test]
    fn test_expiration_time_out_of_range() {
        let token = Token::from_timestamp_millis(i64::MAX, None);
        assert!(token.expiration_time().is_none());

        let token = Token::from_timestamp_millis(1_500, None);
        assert_eq!(token.expiration_time(), Some(at(1_500)));
    }
}
