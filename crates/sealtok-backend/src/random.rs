//! OS randomness.

use crate::error::SealError;
use rand::TryRngCore;
use rand::rngs::OsRng;
use tracing::warn;

/// Fill `buf` from the OS generator.
pub fn fill(buf: &mut [u8]) -> Result<(), SealError> {
    fill_from(&mut OsRng, buf)
}

/// Fill `buf` from `rng`. A generator failure is returned as
/// [`SealError::Randomness`]; there is no fallback source.
pub fn fill_from<R: TryRngCore + ?Sized>(rng: &mut R, buf: &mut [u8]) -> Result<(), SealError> {
    rng.try_fill_bytes(buf).map_err(|e| {
        warn!(error = %e, "random source failed");
        SealError::Randomness(e.to_string())
    })
}

/// Return `N` fresh random bytes.
pub fn array<const N: usize>() -> Result<[u8; N], SealError> {
    let mut out = [0u8; N];
    fill(&mut out)?;
    Ok(out)
}
