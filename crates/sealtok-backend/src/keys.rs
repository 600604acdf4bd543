//! Key material for the sealing backends.
//!
//! Every key type round-trips through lowercase hex ([`HexKey`]) so it can be
//! kept in a file or an environment variable. Composite keys (signed box) are
//! two hex values joined by `:`.

use crate::error::SealError;
use crate::random;
use std::fmt;
use std::path::Path;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Size of every raw key in this crate.
pub const KEY_SIZE: usize = 32;

/// Hex text encoding and file storage for key material.
pub trait HexKey: Sized {
    /// Encode as lowercase hex.
    fn to_hex(&self) -> String;

    /// Decode from hex (surrounding whitespace is ignored).
    fn from_hex(hex: &str) -> Result<Self, SealError>;

    /// Write the hex encoding to `path`.
    fn save_to_file(&self, path: &Path) -> Result<(), SealError> {
        std::fs::write(path, self.to_hex())?;
        Ok(())
    }

    /// Read a hex-encoded key from `path`.
    fn load_from_file(path: &Path) -> Result<Self, SealError> {
        let hex = Zeroizing::new(std::fs::read_to_string(path)?);
        Self::from_hex(hex.trim())
    }
}

fn decode_key(hex: &str, what: &str) -> Result<Zeroizing<[u8; KEY_SIZE]>, SealError> {
    let bytes = Zeroizing::new(
        hex::decode(hex.trim())
            .map_err(|e| SealError::InvalidKey(format!("{what}: {e}")))?,
    );
    let mut out = Zeroizing::new([0u8; KEY_SIZE]);
    if bytes.len() != KEY_SIZE {
        return Err(SealError::InvalidKey(format!(
            "{what}: expected {KEY_SIZE} bytes, got {}",
            bytes.len()
        )));
    }
    out.copy_from_slice(&bytes);
    Ok(out)
}

fn split_pair<'a>(hex: &'a str, what: &str) -> Result<(&'a str, &'a str), SealError> {
    hex.trim()
        .split_once(':')
        .ok_or_else(|| SealError::InvalidKey(format!("{what}: expected '<hex>:<hex>'")))
}

/// Shared secret for the [`crate::Symmetric`] backend.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_SIZE]);

impl SymmetricKey {
    /// Generate a fresh random key.
    pub fn generate() -> Result<Self, SealError> {
        Ok(Self(random::array()?))
    }

    /// Build from raw bytes; must be exactly [`KEY_SIZE`] long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SealError> {
        let key: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| {
            SealError::InvalidKey(format!(
                "symmetric key: expected {KEY_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(key))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl HexKey for SymmetricKey {
    fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    fn from_hex(hex: &str) -> Result<Self, SealError> {
        Ok(Self(*decode_key(hex, "symmetric key")?))
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(<redacted>)")
    }
}

/// Recipient X25519 secret key (opens sealed boxes).
#[derive(Clone)]
pub struct BoxSecretKey(x25519_dalek::StaticSecret);

impl BoxSecretKey {
    /// Generate a fresh random key.
    pub fn generate() -> Result<Self, SealError> {
        let bytes = Zeroizing::new(random::array::<KEY_SIZE>()?);
        Ok(Self(x25519_dalek::StaticSecret::from(*bytes)))
    }

    /// The matching public key.
    pub fn public_key(&self) -> BoxPublicKey {
        BoxPublicKey(x25519_dalek::PublicKey::from(&self.0))
    }

    pub(crate) fn inner(&self) -> &x25519_dalek::StaticSecret {
        &self.0
    }
}

impl HexKey for BoxSecretKey {
    fn to_hex(&self) -> String {
        hex::encode(self.0.as_bytes())
    }

    fn from_hex(hex: &str) -> Result<Self, SealError> {
        let bytes = decode_key(hex, "box secret key")?;
        Ok(Self(x25519_dalek::StaticSecret::from(*bytes)))
    }
}

impl fmt::Debug for BoxSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxSecretKey")
            .field("public", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// Recipient X25519 public key (seals to a recipient).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BoxPublicKey(x25519_dalek::PublicKey);

impl BoxPublicKey {
    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        self.0.as_bytes()
    }

    pub(crate) fn inner(&self) -> &x25519_dalek::PublicKey {
        &self.0
    }
}

impl From<[u8; KEY_SIZE]> for BoxPublicKey {
    fn from(bytes: [u8; KEY_SIZE]) -> Self {
        Self(x25519_dalek::PublicKey::from(bytes))
    }
}

impl HexKey for BoxPublicKey {
    fn to_hex(&self) -> String {
        hex::encode(self.0.as_bytes())
    }

    fn from_hex(hex: &str) -> Result<Self, SealError> {
        Ok(Self::from(*decode_key(hex, "box public key")?))
    }
}

impl fmt::Debug for BoxPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoxPublicKey({})", self.to_hex())
    }
}

/// Sender Ed25519 signing key.
#[derive(Clone)]
pub struct SigningSecretKey(ed25519_dalek::SigningKey);

impl SigningSecretKey {
    /// Generate a fresh random key.
    pub fn generate() -> Result<Self, SealError> {
        let bytes = Zeroizing::new(random::array::<KEY_SIZE>()?);
        Ok(Self(ed25519_dalek::SigningKey::from_bytes(&bytes)))
    }

    /// The matching verifying key.
    pub fn public_key(&self) -> SigningPublicKey {
        SigningPublicKey(self.0.verifying_key())
    }

    pub(crate) fn inner(&self) -> &ed25519_dalek::SigningKey {
        &self.0
    }
}

impl HexKey for SigningSecretKey {
    fn to_hex(&self) -> String {
        hex::encode(self.0.to_bytes())
    }

    fn from_hex(hex: &str) -> Result<Self, SealError> {
        let bytes = decode_key(hex, "signing secret key")?;
        Ok(Self(ed25519_dalek::SigningKey::from_bytes(&bytes)))
    }
}

impl fmt::Debug for SigningSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningSecretKey")
            .field("public", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// Sender Ed25519 verifying key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SigningPublicKey(ed25519_dalek::VerifyingKey);

impl SigningPublicKey {
    pub(crate) fn inner(&self) -> &ed25519_dalek::VerifyingKey {
        &self.0
    }
}

impl HexKey for SigningPublicKey {
    fn to_hex(&self) -> String {
        hex::encode(self.0.as_bytes())
    }

    fn from_hex(hex: &str) -> Result<Self, SealError> {
        let bytes = decode_key(hex, "signing public key")?;
        ed25519_dalek::VerifyingKey::from_bytes(&bytes)
            .map(Self)
            .map_err(|e| SealError::InvalidKey(format!("signing public key: {e}")))
    }
}

impl fmt::Debug for SigningPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningPublicKey({})", self.to_hex())
    }
}

/// Seal-side key for [`crate::SignedBox`]: who signs, and to whom it is sealed.
#[derive(Debug, Clone)]
pub struct SignedSealKey {
    /// Sender's signing key.
    pub sender: SigningSecretKey,
    /// Recipient's public key.
    pub recipient: BoxPublicKey,
}

impl HexKey for SignedSealKey {
    fn to_hex(&self) -> String {
        format!("{}:{}", self.sender.to_hex(), self.recipient.to_hex())
    }

    fn from_hex(hex: &str) -> Result<Self, SealError> {
        let (sender, recipient) = split_pair(hex, "signed seal key")?;
        Ok(Self {
            sender: SigningSecretKey::from_hex(sender)?,
            recipient: BoxPublicKey::from_hex(recipient)?,
        })
    }
}

/// Open-side key for [`crate::SignedBox`]: who decrypts, and whose signature
/// is expected.
#[derive(Debug, Clone)]
pub struct SignedOpenKey {
    /// Recipient's secret key.
    pub recipient: BoxSecretKey,
    /// Sender's verifying key.
    pub sender: SigningPublicKey,
}

impl HexKey for SignedOpenKey {
    fn to_hex(&self) -> String {
        format!("{}:{}", self.recipient.to_hex(), self.sender.to_hex())
    }

    fn from_hex(hex: &str) -> Result<Self, SealError> {
        let (recipient, sender) = split_pair(hex, "signed open key")?;
        Ok(Self {
            recipient: BoxSecretKey::from_hex(recipient)?,
            sender: SigningPublicKey::from_hex(sender)?,
        })
    }
}
