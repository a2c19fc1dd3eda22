use log::trace;
use rayon::prelude::*;

use super::util::{PARALLEL_THRESHOLD, check_alignment, load_array, load_block, xor_blocks};
use crate::core::{BLOCK_SIZE, Block, KeySchedule};
use crate::error::{Error, Result};
use crate::util::random_array;

/// Size of a CBC IV in bytes.
pub const CBC_IV_SIZE: usize = 16;

/// CBC chaining register. Holds the IV before the first call and the last ciphertext block
/// after every call, so passing the same state to the next call continues the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CbcState {
    iv: Block,
}

impl CbcState {
    /// Builds a state from a 16-byte IV. Returns InvalidIvLength for any other length.
    pub fn new(iv: &[u8]) -> Result<Self> {
        if iv.len() != CBC_IV_SIZE {
            return Err(Error::InvalidIvLength {
                len: iv.len(),
                expected: CBC_IV_SIZE,
                mode: "CBC",
            });
        }
        Ok(Self { iv: load_array(iv) })
    }

    /// Random IV from the OS RNG.
    pub fn random() -> Result<Self> {
        Ok(Self { iv: random_array()? })
    }

    /// Current chaining value.
    pub fn iv(&self) -> &Block {
        &self.iv
    }
}

impl From<Block> for CbcState {
    fn from(iv: Block) -> Self {
        Self { iv }
    }
}

/// `C_i = E(P_i ⊕ C_{i-1})`, with `C_0 = iv`. In place; serial by nature.
pub(crate) fn cbc_encrypt_in_place(
    buf: &mut [u8],
    schedule: &KeySchedule,
    state: &mut CbcState,
) -> Result<()> {
    check_alignment(buf.len(), "CBC")?;

    let mut prev = state.iv;
    for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
        prev = schedule.encrypt_block(&xor_blocks(&load_block(chunk), &prev));
        chunk.copy_from_slice(&prev);
    }
    state.iv = prev;

    Ok(())
}

/// `P_i = D(C_i) ⊕ C_{i-1}`, with `C_0 = iv`. In place, so each ciphertext block is saved
/// before it is overwritten.
pub(crate) fn cbc_decrypt_in_place(
    buf: &mut [u8],
    schedule: &KeySchedule,
    state: &mut CbcState,
) -> Result<()> {
    check_alignment(buf.len(), "CBC")?;

    let mut prev = state.iv;
    for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
        let ct = load_block(chunk);
        chunk.copy_from_slice(&xor_blocks(&schedule.decrypt_block(&ct), &prev));
        prev = ct;
    }
    state.iv = prev;

    Ok(())
}

/// Out-of-place CBC decryption. Every plaintext block depends only on two ciphertext blocks,
/// so large inputs are decrypted on the rayon pool.
pub(crate) fn cbc_decrypt(
    input: &[u8],
    schedule: &KeySchedule,
    state: &mut CbcState,
) -> Result<Vec<u8>> {
    check_alignment(input.len(), "CBC")?;

    if input.len() < PARALLEL_THRESHOLD {
        let mut output = input.to_vec();
        cbc_decrypt_in_place(&mut output, schedule, state)?;
        return Ok(output);
    }

    trace!("CBC: decrypting {} blocks on rayon pool", input.len() / BLOCK_SIZE);

    let iv = state.iv;
    let mut output = vec![0u8; input.len()];
    output
        .par_chunks_exact_mut(BLOCK_SIZE)
        .zip(input.par_chunks_exact(BLOCK_SIZE))
        .enumerate()
        .for_each(|(i, (out_chunk, ct))| {
            let prev = if i == 0 {
                iv
            } else {
                load_block(&input[(i - 1) * BLOCK_SIZE..i * BLOCK_SIZE])
            };
            let pt = xor_blocks(&schedule.decrypt_block(&load_block(ct)), &prev);
            out_chunk.copy_from_slice(&pt);
        });

    // input is non-empty here, its last block is the next chaining value
    state.iv = load_block(&input[input.len() - BLOCK_SIZE..]);

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;
    use crate::modes::util::test_util::{CBC_IV, KEY_256, PLAINTEXT, hex_to_bytes, pattern};

    const CBC_256: &str = "
        f58c4c04d6e5f1ba779eabfb5f7bfbd6
        9cfc4e967edb808d679f777bc6702c7d
        39f23369a9d9bacfa530e26304231461
        b2eb05e2c39be9fcda6c19078c6a9d1b";

    fn schedule() -> Result<KeySchedule> {
        Ok(KeySchedule::software(&Key::try_from_slice(&KEY_256)?))
    }

    #[test]
    fn aes_cbc_256_encrypt() -> Result<()> {
        let mut state = CbcState::from(CBC_IV);
        let mut buf = PLAINTEXT.to_vec();
        cbc_encrypt_in_place(&mut buf, &schedule()?, &mut state)?;

        let expected = hex_to_bytes(CBC_256);
        assert_eq!(expected, buf, "encrypted result does not match expected");
        assert_eq!(state.iv(), &expected[48..], "iv not advanced to last ciphertext block");
        Ok(())
    }

    #[test]
    fn aes_cbc_256_decrypt() -> Result<()> {
        let ciphertext = hex_to_bytes(CBC_256);
        let mut state = CbcState::from(CBC_IV);
        let decrypted = cbc_decrypt(&ciphertext, &schedule()?, &mut state)?;

        assert_eq!(PLAINTEXT.to_vec(), decrypted, "decrypted result does not match expected");
        assert_eq!(state.iv(), &ciphertext[48..]);
        Ok(())
    }

    #[test]
    fn zero_key_zero_iv_zero_block() -> Result<()> {
        let schedule = KeySchedule::software(&Key::from([0u8; 32]));
        let mut state = CbcState::from([0u8; 16]);
        let mut buf = vec![0u8; 16];
        cbc_encrypt_in_place(&mut buf, &schedule, &mut state)?;
        assert_eq!(buf, hex_to_bytes("dc95c078a2408989ad48a21492842087"));
        Ok(())
    }

    #[test]
    fn chaining_resumes_across_calls() -> Result<()> {
        let schedule = schedule()?;

        let mut whole_state = CbcState::from(CBC_IV);
        let mut whole = PLAINTEXT.to_vec();
        cbc_encrypt_in_place(&mut whole, &schedule, &mut whole_state)?;

        let mut split_state = CbcState::from(CBC_IV);
        let mut split = PLAINTEXT.to_vec();
        let (first, second) = split.split_at_mut(32);
        cbc_encrypt_in_place(first, &schedule, &mut split_state)?;
        cbc_encrypt_in_place(second, &schedule, &mut split_state)?;

        assert_eq!(whole, split);
        assert_eq!(whole_state, split_state);
        Ok(())
    }

    #[test]
    fn parallel_decrypt_matches_serial() -> Result<()> {
        let schedule = schedule()?;
        let plaintext = pattern(PARALLEL_THRESHOLD + 4 * BLOCK_SIZE);

        let mut enc_state = CbcState::from(CBC_IV);
        let mut ciphertext = plaintext.clone();
        cbc_encrypt_in_place(&mut ciphertext, &schedule, &mut enc_state)?;

        let mut serial_state = CbcState::from(CBC_IV);
        let mut serial = ciphertext.clone();
        cbc_decrypt_in_place(&mut serial, &schedule, &mut serial_state)?;

        let mut parallel_state = CbcState::from(CBC_IV);
        let parallel = cbc_decrypt(&ciphertext, &schedule, &mut parallel_state)?;

        assert_eq!(serial, plaintext);
        assert_eq!(parallel, plaintext);
        assert_eq!(serial_state, parallel_state);
        assert_eq!(parallel_state, enc_state);
        Ok(())
    }

    #[test]
    fn bit_flip_corrupts_two_blocks_only() -> Result<()> {
        let schedule = schedule()?;
        let plaintext = pattern(8 * BLOCK_SIZE);

        let mut ciphertext = plaintext.clone();
        cbc_encrypt_in_place(&mut ciphertext, &schedule, &mut CbcState::from(CBC_IV))?;

        let flipped_block = 3;
        ciphertext[flipped_block * BLOCK_SIZE + 5] ^= 0x01;
        cbc_decrypt_in_place(&mut ciphertext, &schedule, &mut CbcState::from(CBC_IV))?;

        for (i, (dec, orig)) in ciphertext
            .chunks(BLOCK_SIZE)
            .zip(plaintext.chunks(BLOCK_SIZE))
            .enumerate()
        {
            if i == flipped_block || i == flipped_block + 1 {
                assert_ne!(dec, orig, "block {i} should be corrupted");
            } else {
                assert_eq!(dec, orig, "block {i} should be intact");
            }
        }
        Ok(())
    }

    #[test]
    fn rejects_unaligned_without_touching_state() -> Result<()> {
        let schedule = schedule()?;
        let mut state = CbcState::from(CBC_IV);
        let mut buf = vec![0u8; 15];

        assert!(matches!(
            cbc_encrypt_in_place(&mut buf, &schedule, &mut state),
            Err(Error::InvalidBlockAlignment { len: 15, .. })
        ));
        assert!(cbc_decrypt(&buf, &schedule, &mut state).is_err());
        assert_eq!(state.iv(), &CBC_IV);
        assert_eq!(buf, [0u8; 15]);
        Ok(())
    }

    #[test]
    fn iv_length_is_checked() {
        assert!(CbcState::new(&[0u8; 16]).is_ok());
        assert!(matches!(
            CbcState::new(&[0u8; 15]),
            Err(Error::InvalidIvLength { len: 15, expected: 16, .. })
        ));
        assert!(CbcState::new(&[0u8; 32]).is_err());
    }
}
