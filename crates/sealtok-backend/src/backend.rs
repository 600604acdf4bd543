//! The sealing capability.

use crate::error::SealError;

/// Encrypt-and-authenticate / authenticate-and-decrypt over opaque bytes.
///
/// `SealKey` and `OpenKey` are the same type for symmetric backends and a
/// distinct pair for asymmetric ones.
pub trait SealingBackend: Send + Sync {
    /// Key material needed to seal.
    type SealKey;

    /// Key material needed to open.
    type OpenKey;

    /// Short stable name, used in logs.
    const NAME: &'static str;

    /// Bytes added to the plaintext length by `seal`.
    const OVERHEAD: usize;

    /// Seal `plaintext`, binding `associated_data` into the tag.
    ///
    /// Any randomness needed is drawn internally; repeated seals of the same
    /// input produce different ciphertexts.
    fn seal(
        &self,
        key: &Self::SealKey,
        plaintext: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>, SealError>;

    /// Open a ciphertext produced by [`SealingBackend::seal`].
    fn open(
        &self,
        key: &Self::OpenKey,
        ciphertext: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>, SealError>;
}
