//! Shared-secret backend: ChaCha20-Poly1305 with a random nonce prefix.
//!
//! Wire layout: `nonce (12) || ciphertext || tag (16)`.

use crate::backend::SealingBackend;
use crate::error::SealError;
use crate::keys::SymmetricKey;
use crate::random;
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};

/// Nonce width prefixed to every ciphertext.
pub const NONCE_SIZE: usize = 12;

/// Poly1305 tag width.
pub const TAG_SIZE: usize = 16;

/// ChaCha20-Poly1305 under a single shared key.
#[derive(Debug, Clone, Copy, Default)]
pub struct Symmetric;

impl SealingBackend for Symmetric {
    type SealKey = SymmetricKey;
    type OpenKey = SymmetricKey;

    const NAME: &'static str = "symmetric";
    const OVERHEAD: usize = NONCE_SIZE + TAG_SIZE;

    fn seal(
        &self,
        key: &SymmetricKey,
        plaintext: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>, SealError> {
        let nonce = random::array::<NONCE_SIZE>()?;
        let ciphertext = aead_encrypt(key.as_bytes(), &nonce, plaintext, associated_data)?;

        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    fn open(
        &self,
        key: &SymmetricKey,
        ciphertext: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>, SealError> {
        if ciphertext.len() < Self::OVERHEAD {
            return Err(SealError::Authentication);
        }
        let (nonce, sealed) = ciphertext.split_at(NONCE_SIZE);
        aead_decrypt(key.as_bytes(), nonce, sealed, associated_data)
    }
}

/// Encrypt with ChaCha20-Poly1305; returns `ciphertext || tag`.
pub(crate) fn aead_encrypt(
    key: &[u8; 32],
    nonce: &[u8],
    plaintext: &[u8],
    associated_data: &[u8],
) -> Result<Vec<u8>, SealError> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    cipher
        .encrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: plaintext,
                aad: associated_data,
            },
        )
        .map_err(|e| SealError::Encryption(format!("ChaCha20-Poly1305 encryption failed: {e}")))
}

/// Decrypt `ciphertext || tag`; every failure is [`SealError::Authentication`].
pub(crate) fn aead_decrypt(
    key: &[u8; 32],
    nonce: &[u8],
    sealed: &[u8],
    associated_data: &[u8],
) -> Result<Vec<u8>, SealError> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    cipher
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: sealed,
                aad: associated_data,
            },
        )
        .map_err(|_| SealError::Authentication)
}
