//! Anonymous-sender public-key backend.
//!
//! Each seal generates an ephemeral X25519 key `e`. With recipient key `R`:
//!
//! ```text
//! okm   = HKDF-SHA256(salt = e_pub || R, ikm = X25519(e, R), info = INFO)[..44]
//! key   = okm[..32], nonce = okm[32..44]
//! wire  = e_pub (32) || ChaCha20-Poly1305(key, nonce, plaintext, ad)
//! ```
//!
//! The derived key is unique per message, so the derived nonce never repeats
//! under a key.

use crate::backend::SealingBackend;
use crate::error::SealError;
use crate::keys::{BoxPublicKey, BoxSecretKey, KEY_SIZE};
use crate::random;
use crate::symmetric::{NONCE_SIZE, TAG_SIZE, aead_decrypt, aead_encrypt};
use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

/// HKDF info string; changing it is a wire-format break.
pub const INFO: &[u8] = b"sealtok sealed-box v1";

/// Width of the ephemeral public key prefix.
pub const EPHEMERAL_KEY_SIZE: usize = KEY_SIZE;

/// Seal to a recipient's X25519 public key; open with their secret key.
#[derive(Debug, Clone, Copy, Default)]
pub struct SealedBox;

impl SealingBackend for SealedBox {
    type SealKey = BoxPublicKey;
    type OpenKey = BoxSecretKey;

    const NAME: &'static str = "sealed_box";
    const OVERHEAD: usize = EPHEMERAL_KEY_SIZE + TAG_SIZE;

    fn seal(
        &self,
        recipient: &BoxPublicKey,
        plaintext: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>, SealError> {
        seal_to(recipient, plaintext, associated_data)
    }

    fn open(
        &self,
        recipient: &BoxSecretKey,
        ciphertext: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>, SealError> {
        open_with(recipient, ciphertext, associated_data)
    }
}

pub(crate) fn seal_to(
    recipient: &BoxPublicKey,
    plaintext: &[u8],
    associated_data: &[u8],
) -> Result<Vec<u8>, SealError> {
    let ephemeral_bytes = Zeroizing::new(random::array::<KEY_SIZE>()?);
    let ephemeral = x25519_dalek::StaticSecret::from(*ephemeral_bytes);
    let ephemeral_public = x25519_dalek::PublicKey::from(&ephemeral);

    let shared = ephemeral.diffie_hellman(recipient.inner());
    if !shared.was_contributory() {
        return Err(SealError::InvalidKey(
            "recipient public key is a low-order point".to_string(),
        ));
    }

    let derived = derive(
        shared.as_bytes(),
        ephemeral_public.as_bytes(),
        recipient.as_bytes(),
    )?;
    let ciphertext = aead_encrypt(&derived.key, &derived.nonce, plaintext, associated_data)?;

    let mut out = Vec::with_capacity(EPHEMERAL_KEY_SIZE + ciphertext.len());
    out.extend_from_slice(ephemeral_public.as_bytes());
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

pub(crate) fn open_with(
    recipient: &BoxSecretKey,
    ciphertext: &[u8],
    associated_data: &[u8],
) -> Result<Vec<u8>, SealError> {
    let (ephemeral_public, sealed) = ciphertext
        .split_first_chunk::<EPHEMERAL_KEY_SIZE>()
        .ok_or(SealError::Authentication)?;
    if sealed.len() < TAG_SIZE {
        return Err(SealError::Authentication);
    }

    let ephemeral_public = x25519_dalek::PublicKey::from(*ephemeral_public);
    let shared = recipient.inner().diffie_hellman(&ephemeral_public);
    if !shared.was_contributory() {
        return Err(SealError::Authentication);
    }

    let derived = derive(
        shared.as_bytes(),
        ephemeral_public.as_bytes(),
        recipient.public_key().as_bytes(),
    )?;
    aead_decrypt(&derived.key, &derived.nonce, sealed, associated_data)
}

struct DerivedKey {
    key: Zeroizing<[u8; KEY_SIZE]>,
    nonce: [u8; NONCE_SIZE],
}

fn derive(
    shared: &[u8; KEY_SIZE],
    ephemeral_public: &[u8; KEY_SIZE],
    recipient_public: &[u8; KEY_SIZE],
) -> Result<DerivedKey, SealError> {
    let mut salt = [0u8; 2 * KEY_SIZE];
    salt[..KEY_SIZE].copy_from_slice(ephemeral_public);
    salt[KEY_SIZE..].copy_from_slice(recipient_public);

    let hk = Hkdf::<Sha256>::new(Some(&salt[..]), shared);
    let mut okm = Zeroizing::new([0u8; KEY_SIZE + NONCE_SIZE]);
    hk.expand(INFO, &mut okm[..])
        .map_err(|e| SealError::Encryption(format!("HKDF expand failed: {e}")))?;

    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    key.copy_from_slice(&okm[..KEY_SIZE]);
    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(&okm[KEY_SIZE..]);
    Ok(DerivedKey { key, nonce })
}
