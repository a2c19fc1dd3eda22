//! Infinite Garble Extension, the chaining mode used by MTProto.
//!
//! Each block's cipher input is masked with the previous ciphertext block and its output with
//! the previous plaintext block. A corrupted ciphertext block therefore garbles every block
//! decrypted after it, unlike CBC.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::util::{check_alignment, load_array, load_block, xor_blocks};
use crate::core::{BLOCK_SIZE, Block, KeySchedule};
use crate::error::{Error, Result};
use crate::util::random_array;

/// Size of an IGE IV in bytes (two 16-byte chaining blocks).
pub const IGE_IV_SIZE: usize = 32;

/// The two IGE chaining registers. Seeded from a 32-byte IV `iv1 ‖ iv2`, where `iv1` stands in
/// for the previous ciphertext block and `iv2` for the previous plaintext block. Both are
/// updated after every call so the stream can be continued.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct IgeState {
    prev_cipher: Block,
    prev_plain: Block,
}

impl IgeState {
    /// Builds a state from a 32-byte IV. Returns InvalidIvLength for any other length.
    pub fn new(iv: &[u8]) -> Result<Self> {
        if iv.len() != IGE_IV_SIZE {
            return Err(Error::InvalidIvLength {
                len: iv.len(),
                expected: IGE_IV_SIZE,
                mode: "IGE",
            });
        }
        Ok(Self {
            prev_cipher: load_block(&iv[..BLOCK_SIZE]),
            prev_plain: load_block(&iv[BLOCK_SIZE..]),
        })
    }

    /// Random IV from the OS RNG.
    pub fn random() -> Result<Self> {
        Ok(Self::from(random_array::<IGE_IV_SIZE>()?))
    }

    /// Current chaining value as `prev_cipher ‖ prev_plain`, in the same layout as the IV.
    pub fn iv(&self) -> [u8; IGE_IV_SIZE] {
        let mut iv = [0u8; IGE_IV_SIZE];
        iv[..BLOCK_SIZE].copy_from_slice(&self.prev_cipher);
        iv[BLOCK_SIZE..].copy_from_slice(&self.prev_plain);
        iv
    }
}

impl From<[u8; IGE_IV_SIZE]> for IgeState {
    fn from(iv: [u8; IGE_IV_SIZE]) -> Self {
        Self {
            prev_cipher: load_array(&iv[..BLOCK_SIZE]),
            prev_plain: load_array(&iv[BLOCK_SIZE..]),
        }
    }
}

// prev_plain holds plaintext
impl fmt::Debug for IgeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgeState")
            .field("prev_cipher", &self.prev_cipher)
            .finish_non_exhaustive()
    }
}

/// `C_i = E(P_i ⊕ C_{i-1}) ⊕ P_{i-1}`, in place.
pub(crate) fn ige_encrypt_in_place(
    buf: &mut [u8],
    schedule: &KeySchedule,
    state: &mut IgeState,
) -> Result<()> {
    check_alignment(buf.len(), "IGE")?;

    for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
        let plain = load_block(chunk);
        let cipher = xor_blocks(
            &schedule.encrypt_block(&xor_blocks(&plain, &state.prev_cipher)),
            &state.prev_plain,
        );
        chunk.copy_from_slice(&cipher);

        state.prev_cipher = cipher;
        state.prev_plain = plain;
    }

    Ok(())
}

/// `P_i = D(C_i ⊕ P_{i-1}) ⊕ C_{i-1}`, in place.
pub(crate) fn ige_decrypt_in_place(
    buf: &mut [u8],
    schedule: &KeySchedule,
    state: &mut IgeState,
) -> Result<()> {
    check_alignment(buf.len(), "IGE")?;

    for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
        let cipher = load_block(chunk);
        let plain = xor_blocks(
            &schedule.decrypt_block(&xor_blocks(&cipher, &state.prev_plain)),
            &state.prev_cipher,
        );
        chunk.copy_from_slice(&plain);

        state.prev_cipher = cipher;
        state.prev_plain = plain;
    }

    Ok(())
}
