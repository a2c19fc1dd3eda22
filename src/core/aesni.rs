//! AES-256 block transform using the x86 AES-NI instruction set.
//!
//! Round keys are the byte-oriented schedule from [`KeySchedule`](super::KeySchedule); their
//! layout already matches the `__m128i` layout expected by `aesenc`. Decryption uses the
//! equivalent inverse cipher, so it needs the reversed, InvMixColumns-transformed keys.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::{Block, RoundKeys};

/// # Safety
/// The CPU must support the `aes` and `sse2` target features.
#[target_feature(enable = "aes,sse2")]
pub(super) unsafe fn encrypt_block(block: &Block, round_keys: &RoundKeys) -> Block {
    let mut out = [0u8; 16];
    // SAFETY: every pointer comes from a 16-byte array; loads and stores are unaligned.
    unsafe {
        let mut state = _mm_loadu_si128(block.as_ptr().cast());
        state = _mm_xor_si128(state, _mm_loadu_si128(round_keys[0].as_ptr().cast()));
        for round_key in &round_keys[1..14] {
            state = _mm_aesenc_si128(state, _mm_loadu_si128(round_key.as_ptr().cast()));
        }
        state = _mm_aesenclast_si128(state, _mm_loadu_si128(round_keys[14].as_ptr().cast()));
        _mm_storeu_si128(out.as_mut_ptr().cast(), state);
    }
    out
}

/// `inv_round_keys` must be the equivalent-inverse-cipher schedule.
///
/// # Safety
/// The CPU must support the `aes` and `sse2` target features.
#[target_feature(enable = "aes,sse2")]
pub(super) unsafe fn decrypt_block(block: &Block, inv_round_keys: &RoundKeys) -> Block {
    let mut out = [0u8; 16];
    // SAFETY: as above.
    unsafe {
        let mut state = _mm_loadu_si128(block.as_ptr().cast());
        state = _mm_xor_si128(state, _mm_loadu_si128(inv_round_keys[0].as_ptr().cast()));
        for round_key in &inv_round_keys[1..14] {
            state = _mm_aesdec_si128(state, _mm_loadu_si128(round_key.as_ptr().cast()));
        }
        state = _mm_aesdeclast_si128(state, _mm_loadu_si128(inv_round_keys[14].as_ptr().cast()));
        _mm_storeu_si128(out.as_mut_ptr().cast(), state);
    }
    out
}
