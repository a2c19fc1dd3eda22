//! Core AES-256 implementation: key schedule and single-block encryption and decryption,
//! with a portable constant-time backend and an AES-NI backend.

mod backend;
mod constants;
mod decryption;
mod encryption;
mod sbox;
mod schedule;
mod util;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod aesni;

pub use backend::Backend;
pub(crate) use schedule::KeySchedule;

/// Size of an AES block in bytes.
pub const BLOCK_SIZE: usize = 16;

/// A single 16-byte AES block.
pub type Block = [u8; BLOCK_SIZE];

/// The 15 round keys of an AES-256 schedule, including the initial key.
pub type RoundKeys = [Block; constants::NR + 1];
