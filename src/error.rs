use thiserror::Error;
use rand::rand_core;

/// tgcrypt Result type.
pub type Result<T> = std::result::Result<T, Error>;

/// tgcrypt Error type. Every error is raised before any buffer or chaining state is modified.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Attempted to build an AES-256 key from a slice that is not exactly 32 bytes.
    #[error("invalid key length: {len} bytes (expected 32)")]
    InvalidKeyLength { len: usize },

    /// Data passed to a block mode (ECB, CBC, IGE) is not a multiple of 16 bytes.
    #[error("invalid data length for {mode}: {len} bytes (must be a multiple of 16)")]
    InvalidBlockAlignment { len: usize, mode: &'static str },

    /// IV or counter block of the wrong size for the mode.
    #[error("invalid {mode} IV length: {len} bytes (expected {expected})")]
    InvalidIvLength {
        len: usize,
        expected: usize,
        mode: &'static str,
    },

    /// CTR keystream offset outside of 0..=15.
    #[error("invalid CTR state offset: {offset} (expected 0..=15)")]
    InvalidStateOffset { offset: u8 },

    /// One-shot functions refuse empty data.
    #[error("{mode}: data must not be empty")]
    EmptyInput { mode: &'static str },

    /// OS RNG failed during random key or IV generation.
    #[error("OS RNG failed in random key generation")]
    Rng(#[from] rand_core::OsError),
}
