//! Sign-then-encrypt backend.
//!
//! The sender signs the plaintext with Ed25519, then the signature and
//! plaintext are sealed to the recipient with [`crate::SealedBox`]:
//!
//! ```text
//! msg  = DOMAIN || recipient_pub (32) || u64_be(len(ad)) || ad || plaintext
//! wire = SealedBox(recipient_pub, sig(msg) (64) || plaintext, ad)
//! ```
//!
//! Opening needs the recipient's secret key and the sender's verifying key, so
//! a token proves both confidentiality to the recipient and origin from the
//! sender.

use crate::backend::SealingBackend;
use crate::error::SealError;
use crate::keys::{BoxPublicKey, SignedOpenKey, SignedSealKey};
use crate::sealed_box::{self, SealedBox};
use ed25519_dalek::{SIGNATURE_LENGTH, Signature, Signer};

/// Signature domain separator; changing it is a wire-format break.
pub const DOMAIN: &[u8] = b"sealtok signed-box v1";

/// Ed25519 sender signature inside the sealed box.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignedBox;

impl SealingBackend for SignedBox {
    type SealKey = SignedSealKey;
    type OpenKey = SignedOpenKey;

    const NAME: &'static str = "signed_box";
    const OVERHEAD: usize = SealedBox::OVERHEAD + SIGNATURE_LENGTH;

    fn seal(
        &self,
        key: &SignedSealKey,
        plaintext: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>, SealError> {
        let message = signature_input(&key.recipient, associated_data, plaintext);
        let signature = key.sender.inner().sign(&message);

        let mut inner = Vec::with_capacity(SIGNATURE_LENGTH + plaintext.len());
        inner.extend_from_slice(&signature.to_bytes());
        inner.extend_from_slice(plaintext);

        sealed_box::seal_to(&key.recipient, &inner, associated_data)
    }

    fn open(
        &self,
        key: &SignedOpenKey,
        ciphertext: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>, SealError> {
        let mut inner = sealed_box::open_with(&key.recipient, ciphertext, associated_data)?;
        let (signature, plaintext) = inner
            .split_first_chunk::<SIGNATURE_LENGTH>()
            .ok_or(SealError::Authentication)?;

        let signature = Signature::from_bytes(signature);
        let message = signature_input(&key.recipient.public_key(), associated_data, plaintext);
        key.sender
            .inner()
            .verify_strict(&message, &signature)
            .map_err(|_| SealError::Authentication)?;

        inner.drain(..SIGNATURE_LENGTH);
        Ok(inner)
    }
}

fn signature_input(recipient: &BoxPublicKey, associated_data: &[u8], plaintext: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(
        DOMAIN.len() + recipient.as_bytes().len() + 8 + associated_data.len() + plaintext.len(),
    );
    message.extend_from_slice(DOMAIN);
    message.extend_from_slice(recipient.as_bytes());
    message.extend_from_slice(&(associated_data.len() as u64).to_be_bytes());
    message.extend_from_slice(associated_data);
    message.extend_from_slice(plaintext);
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{BoxSecretKey, SigningSecretKey};
    use pretty_assertions::assert_eq;

    fn keys() -> (SignedSealKey, SignedOpenKey) {
        let sender = SigningSecretKey::generate().unwrap();
        let recipient = BoxSecretKey::generate().unwrap();
        (
            SignedSealKey {
                sender: sender.clone(),
                recipient: recipient.public_key(),
            },
            SignedOpenKey {
                recipient,
                sender: sender.public_key(),
            },
        )
    }

    #[test]
    fn test_seal_open() {
        let (seal_key, open_key) = keys();
        let sealed = SignedBox.seal(&seal_key, b"payload", b"ad").unwrap();

        assert_eq!(sealed.len(), 7 + SignedBox::OVERHEAD);
        assert_eq!(
            SignedBox.open(&open_key, &sealed, b"ad").unwrap(),
            b"payload"
        );
    }

    #[test]
    fn test_forged_sender_rejected() {
        let (_, open_key) = keys();
        let impostor = SignedSealKey {
            sender: SigningSecretKey::generate().unwrap(),
            recipient: open_key.recipient.public_key(),
        };

        let sealed = SignedBox.seal(&impostor, b"payload", b"").unwrap();
        assert!(matches!(
            SignedBox.open(&open_key, &sealed, b""),
            Err(SealError::Authentication)
        ));
    }

    #[test]
    fn test_unsigned_sealed_box_rejected() {
        let (_, open_key) = keys();
        let sealed = SealedBox
            .seal(&open_key.recipient.public_key(), &[0u8; 80], b"")
            .unwrap();
        assert!(matches!(
            SignedBox.open(&open_key, &sealed, b""),
            Err(SealError::Authentication)
        ));
    }

    #[test]
    fn test_signature_binds_recipient() {
        let a = signature_input(&BoxPublicKey::from([1u8; 32]), b"", b"pt");
        let b = signature_input(&BoxPublicKey::from([2u8; 32]), b"", b"pt");
        assert_ne!(a, b);
    }

    #[test]
    fn test_signature_input_is_unambiguous() {
        // Moving bytes between associated data and plaintext changes the message.
        let recipient = BoxPublicKey::from([1u8; 32]);
        assert_ne!(
            signature_input(&recipient, b"ab", b"c"),
            signature_input(&recipient, b"a", b"bc")
        );
    }
}
