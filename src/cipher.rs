use crate::core::{Backend, Block, KeySchedule, RoundKeys};
use crate::error::Result;
use crate::key::Key;
use crate::modes::*;

/// AES-256 bound to one key. Provides the raw block transform and the [ECB](Cipher::encrypt_ecb),
/// [CBC](Cipher::encrypt_cbc), [CTR](Cipher::apply_ctr) and [IGE](Cipher::encrypt_ige) modes.
///
/// The key is expanded once on construction and never changes afterwards, so a `Cipher` can be
/// shared between threads and reused for any number of independent streams. Per-stream
/// chaining state ([`CbcState`], [`CtrState`], [`IgeState`]) is owned by the caller and passed
/// to each call. A call that returns an error leaves its state and buffer untouched.
///
/// ## Examples
/// ```
/// # fn main() -> tgcrypt::Result<()> {
/// use tgcrypt::{Cipher, IgeState, Key};
///
/// let cipher = Cipher::new(&Key::random()?);
/// let iv = [0x24u8; 32];
///
/// let plaintext = [0x61u8; 48];
/// let ciphertext = cipher.encrypt_ige(&mut IgeState::from(iv), &plaintext)?;
/// let decrypted = cipher.decrypt_ige(&mut IgeState::from(iv), &ciphertext)?;
/// assert_eq!(decrypted, plaintext);
///
/// // block modes do not pad
/// assert!(cipher.encrypt_ige(&mut IgeState::from(iv), &plaintext[..47]).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Cipher {
    schedule: KeySchedule,
}

impl Cipher {
    /// Expands `key` using the fastest backend available on this CPU.
    pub fn new(key: &Key) -> Self {
        Self::with_backend(key, Backend::detect())
    }

    /// Expands `key` for a specific backend. Falls back to [`Backend::Software`] if the
    /// requested backend is not available.
    pub fn with_backend(key: &Key, backend: Backend) -> Self {
        Self {
            schedule: KeySchedule::new(key, backend),
        }
    }

    /// Builds a cipher straight from key bytes. Returns InvalidKeyLength unless `key` is 32 bytes.
    pub fn try_from_slice(key: &[u8]) -> Result<Self> {
        Ok(Self::new(&Key::try_from_slice(key)?))
    }

    /// Getter for the 15 round keys of the expanded schedule.
    pub fn round_keys(&self) -> &RoundKeys {
        self.schedule.round_keys()
    }

    /// Backend performing the block transform.
    pub fn backend(&self) -> Backend {
        self.schedule.backend()
    }

    /// Encrypts a single block.
    pub fn encrypt_block(&self, block: &Block) -> Block {
        self.schedule.encrypt_block(block)
    }

    /// Decrypts a single block.
    pub fn decrypt_block(&self, block: &Block) -> Block {
        self.schedule.decrypt_block(block)
    }

    /// **Electronic codebook**. Transforms each 16-byte block independently.
    /// `data` must be a multiple of 16 bytes; no padding is applied.
    pub fn process_ecb(&self, direction: Direction, data: &[u8]) -> Result<Vec<u8>> {
        check_alignment(data.len(), "ECB")?;
        let mut out = data.to_vec();
        ecb_in_place(&mut out, &self.schedule, direction)?;
        Ok(out)
    }

    /// **Electronic codebook** encryption. **Identical plaintext blocks produce identical
    /// ciphertext blocks.**
    pub fn encrypt_ecb(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.process_ecb(Direction::Encrypt, plaintext)
    }

    /// **Electronic codebook** decryption.
    pub fn decrypt_ecb(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.process_ecb(Direction::Decrypt, ciphertext)
    }

    /// In-place ECB.
    pub fn process_ecb_in_place(&self, direction: Direction, buf: &mut [u8]) -> Result<()> {
        ecb_in_place(buf, &self.schedule, direction)
    }

    /// **Cipher block chaining** encryption.
    ///
    /// Each plaintext block is `XOR`'d with the previous ciphertext block (the IV for the first
    /// block) before encryption. `state` ends holding the last ciphertext block.
    pub fn encrypt_cbc(&self, state: &mut CbcState, plaintext: &[u8]) -> Result<Vec<u8>> {
        check_alignment(plaintext.len(), "CBC")?;
        let mut out = plaintext.to_vec();
        cbc_encrypt_in_place(&mut out, &self.schedule, state)?;
        Ok(out)
    }

    /// **Cipher block chaining** decryption. Large inputs are decrypted in parallel.
    pub fn decrypt_cbc(&self, state: &mut CbcState, ciphertext: &[u8]) -> Result<Vec<u8>> {
        cbc_decrypt(ciphertext, &self.schedule, state)
    }

    /// In-place CBC encryption.
    pub fn encrypt_cbc_in_place(&self, state: &mut CbcState, buf: &mut [u8]) -> Result<()> {
        cbc_encrypt_in_place(buf, &self.schedule, state)
    }

    /// In-place CBC decryption.
    pub fn decrypt_cbc_in_place(&self, state: &mut CbcState, buf: &mut [u8]) -> Result<()> {
        cbc_decrypt_in_place(buf, &self.schedule, state)
    }

    /// **Counter mode**. Encryption and decryption are the same operation.
    ///
    /// For each byte of input:
    /// 1. If no keystream is buffered, the counter block is encrypted to produce one.
    /// 2. The byte is `XOR`'d with the keystream byte at the current offset.
    /// 3. Once all 16 keystream bytes are used, the counter is incremented as a 128-bit
    ///    big-endian integer (wrapping) and the offset returns to zero.
    ///
    /// Any length is accepted. `state` records where the stream stopped, so calls can be split
    /// at arbitrary byte boundaries.
    ///
    /// **Important**: a counter value must never be reused with the same key.
    pub fn apply_ctr(&self, state: &mut CtrState, data: &[u8]) -> Vec<u8> {
        let mut out = data.to_vec();
        ctr_apply_in_place(&mut out, &self.schedule, state);
        out
    }

    /// In-place CTR.
    pub fn apply_ctr_in_place(&self, state: &mut CtrState, buf: &mut [u8]) {
        ctr_apply_in_place(buf, &self.schedule, state);
    }

    /// **Counter mode** encryption. Alias of [`apply_ctr`](Cipher::apply_ctr).
    pub fn encrypt_ctr(&self, state: &mut CtrState, plaintext: &[u8]) -> Vec<u8> {
        self.apply_ctr(state, plaintext)
    }

    /// **Counter mode** decryption. Alias of [`apply_ctr`](Cipher::apply_ctr).
    pub fn decrypt_ctr(&self, state: &mut CtrState, ciphertext: &[u8]) -> Vec<u8> {
        self.apply_ctr(state, ciphertext)
    }

    /// **Infinite garble extension** encryption, as used by MTProto.
    ///
    /// `C_i = E(P_i ⊕ C_{i-1}) ⊕ P_{i-1}`, where `C_0` and `P_0` are the two halves of the
    /// 32-byte IV. Not interchangeable with CBC: a modified ciphertext block garbles every
    /// following plaintext block.
    pub fn encrypt_ige(&self, state: &mut IgeState, plaintext: &[u8]) -> Result<Vec<u8>> {
        check_alignment(plaintext.len(), "IGE")?;
        let mut out = plaintext.to_vec();
        ige_encrypt_in_place(&mut out, &self.schedule, state)?;
        Ok(out)
    }

    /// **Infinite garble extension** decryption: `P_i = D(C_i ⊕ P_{i-1}) ⊕ C_{i-1}`.
    pub fn decrypt_ige(&self, state: &mut IgeState, ciphertext: &[u8]) -> Result<Vec<u8>> {
        check_alignment(ciphertext.len(), "IGE")?;
        let mut out = ciphertext.to_vec();
        ige_decrypt_in_place(&mut out, &self.schedule, state)?;
        Ok(out)
    }

    /// In-place IGE encryption.
    pub fn encrypt_ige_in_place(&self, state: &mut IgeState, buf: &mut [u8]) -> Result<()> {
        ige_encrypt_in_place(buf, &self.schedule, state)
    }

    /// In-place IGE decryption.
    pub fn decrypt_ige_in_place(&self, state: &mut IgeState, buf: &mut [u8]) -> Result<()> {
        ige_decrypt_in_place(buf, &self.schedule, state)
    }
}
