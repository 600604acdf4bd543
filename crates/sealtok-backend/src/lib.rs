//! # sealtok-backend
//!
//! Sealing backends for sealtok tokens.
//!
//! A backend turns `(plaintext, associated_data)` into an authenticated
//! ciphertext and back. The token layer never sees the algorithm or the key
//! topology; it only holds a [`SealingBackend`] value.
//!
//! | Backend | Seal with | Open with | Overhead |
//! |---------|-----------|-----------|----------|
//! | [`Symmetric`] | shared [`SymmetricKey`] | same key | 28 bytes |
//! | [`SealedBox`] | recipient [`BoxPublicKey`] | recipient [`BoxSecretKey`] | 48 bytes |
//! | [`SignedBox`] | [`SignedSealKey`] | [`SignedOpenKey`] | 112 bytes |
//!
//! A [`SignedSealKey`] pairs the sender's signing key with the recipient's
//! public key; a [`SignedOpenKey`] pairs the recipient's secret key with the
//! sender's verifying key.
//!
//! Every `open` failure caused by the input (short, tampered, wrong key, wrong
//! associated data) is the same [`SealError::Authentication`].

pub mod backend;
pub mod error;
pub mod keys;
pub mod random;
pub mod sealed_box;
pub mod signed_box;
pub mod symmetric;

pub use backend::SealingBackend;
pub use error::SealError;
pub use keys::{
    BoxPublicKey, BoxSecretKey, HexKey, SignedOpenKey, SignedSealKey, SigningPublicKey,
    SigningSecretKey, SymmetricKey,
};
pub use sealed_box::SealedBox;
pub use signed_box::SignedBox;
pub use symmetric::Symmetric;
