use std::fmt;

use log::trace;
use rayon::prelude::*;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::util::{PARALLEL_THRESHOLD, increment_counter, load_array};
use crate::core::{BLOCK_SIZE, Block, KeySchedule};
use crate::error::{Error, Result};
use crate::util::random_array;

/// Size of a CTR counter block in bytes.
pub const CTR_IV_SIZE: usize = 16;

/// Resumable CTR stream position: a 128-bit big-endian counter, the keystream block for that
/// counter, and the offset of the next unused keystream byte.
///
/// The counter only advances once all 16 bytes of its keystream block have been used, so a
/// stream may be split into calls at any byte boundary. The buffered keystream is wiped when
/// it is consumed and when the state is dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct CtrState {
    counter: Block,
    keystream: Option<Block>,
    offset: usize,
}

impl CtrState {
    /// Starts a stream at a 16-byte initial counter block. Returns InvalidIvLength for any
    /// other length.
    pub fn new(counter: &[u8]) -> Result<Self> {
        Self::resume(counter, 0)
    }

    /// Resumes a stream at `counter` with `offset` keystream bytes of that block already used.
    /// The keystream block is regenerated on the next call.
    pub fn resume(counter: &[u8], offset: u8) -> Result<Self> {
        if counter.len() != CTR_IV_SIZE {
            return Err(Error::InvalidIvLength {
                len: counter.len(),
                expected: CTR_IV_SIZE,
                mode: "CTR",
            });
        }
        if offset as usize >= BLOCK_SIZE {
            return Err(Error::InvalidStateOffset { offset });
        }
        Ok(Self {
            counter: load_array(counter),
            keystream: None,
            offset: offset as usize,
        })
    }

    /// Random initial counter from the OS RNG.
    pub fn random() -> Result<Self> {
        Ok(Self::from(random_array::<CTR_IV_SIZE>()?))
    }

    /// Counter block whose keystream is currently in use.
    pub fn counter(&self) -> &Block {
        &self.counter
    }

    /// Number of keystream bytes of the current counter block already used (0..=15).
    pub fn offset(&self) -> u8 {
        self.offset as u8
    }

    /// Applies the keystream one byte at a time. Used for the unaligned head and tail of a call.
    fn xor_bytes(&mut self, schedule: &KeySchedule, data: &mut [u8]) {
        for byte in data {
            let counter = self.counter;
            let keystream = self
                .keystream
                .get_or_insert_with(|| schedule.encrypt_block(&counter));
            *byte ^= keystream[self.offset];
            self.offset += 1;

            if self.offset == BLOCK_SIZE {
                self.offset = 0;
                self.keystream.zeroize();
                increment_counter(&mut self.counter);
            }
        }
    }
}

impl From<Block> for CtrState {
    fn from(counter: Block) -> Self {
        Self {
            counter,
            keystream: None,
            offset: 0,
        }
    }
}

// keystream stays out of logs
impl fmt::Debug for CtrState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CtrState")
            .field("counter", &self.counter)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

/// Core counter algorithm (CTR is symmetric, so this both encrypts and decrypts).
/// XORs `buf` in place with the keystream starting at `state` and advances `state` past it.
/// Any length is accepted; an empty buffer leaves the state unchanged.
pub(crate) fn ctr_apply_in_place(buf: &mut [u8], schedule: &KeySchedule, state: &mut CtrState) {
    let mut rest = buf;

    // finish the partially used keystream block first
    if state.offset != 0 {
        let take = (BLOCK_SIZE - state.offset).min(rest.len());
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(take);
        state.xor_bytes(schedule, head);
        rest = tail;
    }

    // whole blocks start at offset 0 with no buffered keystream
    let whole = rest.len() - rest.len() % BLOCK_SIZE;
    let (blocks, tail) = rest.split_at_mut(whole);
    if !blocks.is_empty() {
        let start = u128::from_be_bytes(state.counter);
        let num_blocks = blocks.len() / BLOCK_SIZE;

        if blocks.len() >= PARALLEL_THRESHOLD {
            trace!("CTR: {num_blocks} blocks on rayon pool");
            blocks
                .par_chunks_exact_mut(BLOCK_SIZE)
                .enumerate()
                .for_each(|(i, chunk)| xor_keystream(schedule, start, i, chunk));
        } else {
            blocks
                .chunks_exact_mut(BLOCK_SIZE)
                .enumerate()
                .for_each(|(i, chunk)| xor_keystream(schedule, start, i, chunk));
        }

        state.counter = start.wrapping_add(num_blocks as u128).to_be_bytes();
    }

    state.xor_bytes(schedule, tail);
}

#[inline(always)]
fn xor_keystream(schedule: &KeySchedule, start: u128, index: usize, chunk: &mut [u8]) {
    let counter = start.wrapping_add(index as u128).to_be_bytes();
    let keystream = schedule.encrypt_block(&counter);
    for (byte, k) in chunk.iter_mut().zip(keystream) {
        *byte ^= k;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;
    use crate::modes::util::test_util::{CTR_COUNTER, KEY_256, PLAINTEXT, hex_to_bytes, pattern};

    const CTR_256: &str = "
        601ec313775789a5b7a7f504bbf3d228
        f443e3ca4d62b59aca84e990cacaf5c5
        2b0930daa23de94ce87017ba2d84988d
        dfc9c58db67aada613c2dd08457941a6";

    fn schedule() -> Result<KeySchedule> {
        Ok(KeySchedule::software(&Key::try_from_slice(&KEY_256)?))
    }

    /// Byte-at-a-time reference with no block fast path.
    fn reference(data: &[u8], schedule: &KeySchedule, state: &mut CtrState) -> Vec<u8> {
        let mut out = data.to_vec();
        state.xor_bytes(schedule, &mut out);
        out
    }

    #[test]
    fn aes_ctr_256_encrypt() -> Result<()> {
        let mut state = CtrState::from(CTR_COUNTER);
        let mut buf = PLAINTEXT.to_vec();
        ctr_apply_in_place(&mut buf, &schedule()?, &mut state);

        assert_eq!(hex_to_bytes(CTR_256), buf, "encrypted result does not match expected");

        // four blocks consumed: ...feff + 4
        let mut expected_counter = CTR_COUNTER;
        expected_counter[14] = 0xff;
        expected_counter[15] = 0x03;
        assert_eq!(state.counter(), &expected_counter);
        assert_eq!(state.offset(), 0);
        Ok(())
    }

    #[test]
    fn aes_ctr_256_decrypt() -> Result<()> {
        let mut state = CtrState::from(CTR_COUNTER);
        let mut buf = hex_to_bytes(CTR_256);
        ctr_apply_in_place(&mut buf, &schedule()?, &mut state);

        assert_eq!(PLAINTEXT.to_vec(), buf, "decrypted result does not match expected");
        Ok(())
    }

    #[test]
    fn split_at_every_boundary_matches_single_call() -> Result<()> {
        let schedule = schedule()?;
        let mut expected = PLAINTEXT.to_vec();
        let mut whole_state = CtrState::from(CTR_COUNTER);
        ctr_apply_in_place(&mut expected, &schedule, &mut whole_state);

        for split in 0..=PLAINTEXT.len() {
            let mut buf = PLAINTEXT.to_vec();
            let mut state = CtrState::from(CTR_COUNTER);
            let (first, second) = buf.split_at_mut(split);
            ctr_apply_in_place(first, &schedule, &mut state);
            ctr_apply_in_place(second, &schedule, &mut state);

            assert_eq!(buf, expected, "split at {split} diverged");
            assert_eq!(state.counter(), whole_state.counter());
            assert_eq!(state.offset(), whole_state.offset());
        }
        Ok(())
    }

    #[test]
    fn many_small_calls_match_reference() -> Result<()> {
        let schedule = schedule()?;
        let data = pattern(200);

        let mut ref_state = CtrState::from(CTR_COUNTER);
        let expected = reference(&data, &schedule, &mut ref_state);

        let mut state = CtrState::from(CTR_COUNTER);
        let mut out = Vec::new();
        for piece in data.chunks(7) {
            let mut piece = piece.to_vec();
            ctr_apply_in_place(&mut piece, &schedule, &mut state);
            out.extend_from_slice(&piece);
        }

        assert_eq!(out, expected);
        assert_eq!(state.counter(), ref_state.counter());
        assert_eq!(state.offset(), ref_state.offset());
        assert_eq!(state.offset(), (200 % 16) as u8);
        Ok(())
    }

    #[test]
    fn parallel_path_matches_reference() -> Result<()> {
        let schedule = schedule()?;
        let data = pattern(PARALLEL_THRESHOLD * 2 + 9);

        let mut ref_state = CtrState::resume(&CTR_COUNTER, 3)?;
        let expected = reference(&data, &schedule, &mut ref_state);

        let mut state = CtrState::resume(&CTR_COUNTER, 3)?;
        let mut buf = data.clone();
        ctr_apply_in_place(&mut buf, &schedule, &mut state);

        assert_eq!(buf, expected);
        assert_eq!(state.counter(), ref_state.counter());
        assert_eq!(state.offset(), ref_state.offset());
        Ok(())
    }

    #[test]
    fn counter_wraps_modulo_2_128() -> Result<()> {
        let schedule = schedule()?;
        let mut state = CtrState::from([0xff; 16]);
        let mut buf = vec![0u8; 40];
        ctr_apply_in_place(&mut buf, &schedule, &mut state);

        let mut one = [0u8; 16];
        one[15] = 1;
        assert_eq!(&buf[..16], &schedule.encrypt_block(&[0xff; 16]));
        assert_eq!(&buf[16..32], &schedule.encrypt_block(&[0u8; 16]));
        assert_eq!(&buf[32..], &schedule.encrypt_block(&one)[..8]);
        assert_eq!(state.counter(), &one);
        assert_eq!(state.offset(), 8);
        Ok(())
    }

    #[test]
    fn empty_input_is_a_no_op() -> Result<()> {
        let mut state = CtrState::resume(&CTR_COUNTER, 5)?;
        let before = state.clone();
        ctr_apply_in_place(&mut [], &schedule()?, &mut state);
        assert_eq!(state, before);
        Ok(())
    }

    #[test]
    fn resume_validates_inputs() {
        assert!(matches!(
            CtrState::new(&[0u8; 12]),
            Err(Error::InvalidIvLength { len: 12, expected: 16, .. })
        ));
        assert!(matches!(
            CtrState::resume(&[0u8; 16], 16),
            Err(Error::InvalidStateOffset { offset: 16 })
        ));
        assert!(CtrState::resume(&[0u8; 16], 15).is_ok());
    }

    #[test]
    fn debug_hides_keystream() -> Result<()> {
        let mut state = CtrState::from([0u8; 16]);
        ctr_apply_in_place(&mut [0u8; 3], &schedule()?, &mut state);
        assert!(!format!("{state:?}").contains("keystream"));
        Ok(())
    }
}
