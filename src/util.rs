use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::error::Result;

/// Fills an array from the OS RNG. Used for random IVs and counters.
pub(crate) fn random_array<const N: usize>() -> Result<[u8; N]> {
    let mut out = [0u8; N];
    OsRng.try_fill_bytes(&mut out)?;
    Ok(out)
}
