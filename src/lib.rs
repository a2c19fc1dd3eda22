//! AES-256 with the four modes an MTProto client needs: raw block (ECB), CBC, CTR and IGE.
//!
//! A [`Cipher`] expands a [`Key`] once and is then shared freely. Chaining state for CBC, CTR
//! and IGE lives in explicit values ([`CbcState`], [`CtrState`], [`IgeState`]) that the caller
//! passes to every call, so one key can drive many independent streams. Block transforms use
//! AES-NI when the CPU has it and a constant-time software implementation otherwise.
//!
//! ```
//! # fn main() -> tgcrypt::Result<()> {
//! use tgcrypt::{Cipher, CtrState, Key};
//!
//! let cipher = Cipher::new(&Key::try_from_slice(&[7u8; 32])?);
//!
//! // split a CTR stream across calls at any byte boundary
//! let mut state = CtrState::new(&[0u8; 16])?;
//! let mut ciphertext = cipher.apply_ctr(&mut state, b"hello ");
//! ciphertext.extend(cipher.apply_ctr(&mut state, b"world"));
//!
//! let whole = cipher.apply_ctr(&mut CtrState::new(&[0u8; 16])?, b"hello world");
//! assert_eq!(ciphertext, whole);
//! # Ok(())
//! # }
//! ```

mod cipher;
mod core;
mod error;
mod key;
mod modes;
mod oneshot;
mod util;

pub use crate::core::{BLOCK_SIZE, Backend, Block, RoundKeys};
pub use cipher::Cipher;
pub use error::{Error, Result};
pub use key::{KEY_SIZE, Key};
pub use modes::{CBC_IV_SIZE, CTR_IV_SIZE, CbcState, CtrState, Direction, IGE_IV_SIZE, IgeState};
pub use oneshot::{
    cbc256_decrypt, cbc256_encrypt, ctr256_decrypt, ctr256_encrypt, ige256_decrypt,
    ige256_encrypt,
};
