//! Defines the [`Key`] struct, which holds a valid AES-256 key.
//! Keys can be randomly generated or constructed from an existing byte slice.

use std::fmt;

use rand::TryRngCore;
use rand::rngs::OsRng;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

/// Size of an AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;

/// Contains a valid 256-bit AES key. Can be instantiated with a random key, or built from
/// a slice of exactly 32 bytes. The key bytes are wiped when the `Key` is dropped.
/// A `Key` is required to instantiate a [Cipher](crate::Cipher).
///
/// ## Examples
/// ```
/// # fn main() -> tgcrypt::Result<()> {
/// use tgcrypt::Key;
///
/// // Instantiate a random key:
/// let random = Key::random()?;
///
/// // Instantiate a key from a slice:
/// let key_bytes: [u8; 32] = [0xBA, 0x32, 0x82, 0x9A, 0x43, 0x8A, 0x48, 0xED,
///                            0xC2, 0xEA, 0x10, 0x73, 0x26, 0xF8, 0xA9, 0x62,
///                            0xDE, 0x82, 0x06, 0xBA, 0x53, 0xC2, 0xC7, 0x55,
///                            0x2C, 0x72, 0xC5, 0x37, 0xBF, 0xD4, 0xDB, 0x5E];
/// let key = Key::try_from_slice(&key_bytes)?;
/// assert_eq!(key.as_bytes(), &key_bytes);
/// assert_ne!(random, key);
///
/// // Anything other than 32 bytes returns an InvalidKeyLength error:
/// assert!(Key::try_from_slice(&key_bytes[..31]).is_err());
/// assert!(Key::try_from_slice(&key_bytes[..16]).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Key {
    bytes: [u8; KEY_SIZE],
}

impl Key {
    /// Generate a random 256-bit key. Returns Error if OsRng fails.
    pub fn random() -> Result<Self> {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(Self { bytes })
    }

    /// Attempts to build a key from a slice of bytes. Returns an InvalidKeyLength error
    /// if the input slice is anything other than 32 bytes long.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| Error::InvalidKeyLength { len: bytes.len() })?;
        Ok(Self { bytes })
    }

    /// Returns a reference to the internal key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl From<[u8; KEY_SIZE]> for Key {
    fn from(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }
}

// never print key material
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Key([REDACTED; 32])")
    }
}
