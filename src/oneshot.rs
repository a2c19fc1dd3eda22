//! Stateless one-shot functions taking raw key and IV bytes, mirroring the API MTProto client
//! libraries expect. Each call expands the key, so prefer [`Cipher`] when one key encrypts many
//! messages.

use crate::cipher::Cipher;
use crate::error::{Error, Result};
use crate::modes::{CbcState, CtrState, IgeState};

fn check_not_empty(data: &[u8], mode: &'static str) -> Result<()> {
    if data.is_empty() {
        return Err(Error::EmptyInput { mode });
    }
    Ok(())
}

/// AES-256-IGE encryption. `key` must be 32 bytes, `iv` 32 bytes and `data` a non-empty
/// multiple of 16 bytes.
pub fn ige256_encrypt(data: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    check_not_empty(data, "IGE")?;
    let mut state = IgeState::new(iv)?;
    Cipher::try_from_slice(key)?.encrypt_ige(&mut state, data)
}

/// AES-256-IGE decryption.
pub fn ige256_decrypt(data: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    check_not_empty(data, "IGE")?;
    let mut state = IgeState::new(iv)?;
    Cipher::try_from_slice(key)?.decrypt_ige(&mut state, data)
}

/// AES-256-CBC encryption. `key` must be 32 bytes, `iv` 16 bytes and `data` a non-empty
/// multiple of 16 bytes.
pub fn cbc256_encrypt(data: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    check_not_empty(data, "CBC")?;
    let mut state = CbcState::new(iv)?;
    Cipher::try_from_slice(key)?.encrypt_cbc(&mut state, data)
}

/// AES-256-CBC decryption.
pub fn cbc256_decrypt(data: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    check_not_empty(data, "CBC")?;
    let mut state = CbcState::new(iv)?;
    Cipher::try_from_slice(key)?.decrypt_cbc(&mut state, data)
}

/// AES-256-CTR. `iv` is the 16-byte counter block and `state` the number of keystream bytes of
/// that block already used (0..=15). Both are advanced in place, so passing them to the next
/// call continues the stream.
pub fn ctr256_encrypt(data: &[u8], key: &[u8], iv: &mut [u8], state: &mut u8) -> Result<Vec<u8>> {
    check_not_empty(data, "CTR")?;
    let mut ctr = CtrState::resume(iv, *state)?;
    let out = Cipher::try_from_slice(key)?.apply_ctr(&mut ctr, data);

    iv.copy_from_slice(ctr.counter());
    *state = ctr.offset();
    Ok(out)
}

/// AES-256-CTR decryption. Identical to [`ctr256_encrypt`].
pub fn ctr256_decrypt(data: &[u8], key: &[u8], iv: &mut [u8], state: &mut u8) -> Result<Vec<u8>> {
    ctr256_encrypt(data, key, iv, state)
}
