use crate::core::{BLOCK_SIZE, Block};
use crate::error::{Error, Result};

/// Inputs at least this large are processed on the rayon pool where the mode allows it.
pub(crate) const PARALLEL_THRESHOLD: usize = 4 * 1024;

/// Rejects data that is not a whole number of blocks.
#[inline]
pub(crate) fn check_alignment(len: usize, mode: &'static str) -> Result<()> {
    if len % BLOCK_SIZE != 0 {
        return Err(Error::InvalidBlockAlignment { len, mode });
    }
    Ok(())
}

/// Copies a 16-byte chunk into a block.
#[inline(always)]
pub(crate) fn load_block(chunk: &[u8]) -> Block {
    let mut block = [0u8; BLOCK_SIZE];
    block.copy_from_slice(chunk);
    block
}

/// Builds a fixed-size array from a slice already checked to have length `N`.
#[inline(always)]
pub(crate) fn load_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    out
}

#[inline(always)]
pub(crate) fn xor_blocks(a: &Block, b: &Block) -> Block {
    std::array::from_fn(|i| a[i] ^ b[i])
}

/// Increments a counter block as a 128-bit big-endian integer, wrapping on overflow.
#[inline(always)]
pub(crate) fn increment_counter(counter: &mut Block) {
    *counter = u128::from_be_bytes(*counter).wrapping_add(1).to_be_bytes();
}
