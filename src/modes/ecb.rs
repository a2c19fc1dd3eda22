use log::trace;
use rayon::prelude::*;

use super::Direction;
use super::util::{PARALLEL_THRESHOLD, check_alignment, load_block};
use crate::core::{BLOCK_SIZE, KeySchedule};
use crate::error::Result;

/// Core ECB algorithm. Transforms each 16-byte block of `buf` independently, in place.
/// No padding is applied; `buf` must be block aligned. Large buffers are split across the
/// rayon pool since blocks have no dependencies on each other.
pub(crate) fn ecb_in_place(buf: &mut [u8], schedule: &KeySchedule, direction: Direction) -> Result<()> {
    check_alignment(buf.len(), "ECB")?;

    let transform = |chunk: &mut [u8]| {
        let block = load_block(chunk);
        let out = match direction {
            Direction::Encrypt => schedule.encrypt_block(&block),
            Direction::Decrypt => schedule.decrypt_block(&block),
        };
        chunk.copy_from_slice(&out);
    };

    if buf.len() >= PARALLEL_THRESHOLD {
        trace!("ECB: {} blocks on rayon pool", buf.len() / BLOCK_SIZE);
        buf.par_chunks_exact_mut(BLOCK_SIZE).for_each(transform);
    } else {
        buf.chunks_exact_mut(BLOCK_SIZE).for_each(transform);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::key::Key;
    use crate::modes::util::test_util::{KEY_256, PLAINTEXT, hex_to_bytes, pattern};

    const ECB_256: &str = "
        f3eed1bdb5d2a03c064b5a7e3db181f8
        591ccb10d410ed26dc5ba74a31362870
        b6ed21b99ca6f4f9f153e7b1beafed1d
        23304b7a39f9f3ff067d8d8f9e24ecc7";

    fn schedule() -> Result<KeySchedule> {
        Ok(KeySchedule::software(&Key::try_from_slice(&KEY_256)?))
    }

    #[test]
    fn aes_ecb_256_encrypt() -> Result<()> {
        let mut buf = PLAINTEXT.to_vec();
        ecb_in_place(&mut buf, &schedule()?, Direction::Encrypt)?;
        assert_eq!(hex_to_bytes(ECB_256), buf, "encrypted result does not match expected");
        Ok(())
    }

    #[test]
    fn aes_ecb_256_decrypt() -> Result<()> {
        let mut buf = hex_to_bytes(ECB_256);
        ecb_in_place(&mut buf, &schedule()?, Direction::Decrypt)?;
        assert_eq!(PLAINTEXT.to_vec(), buf, "decrypted result does not match expected");
        Ok(())
    }

    #[test]
    fn parallel_path_matches_serial() -> Result<()> {
        let schedule = schedule()?;
        let data = pattern(PARALLEL_THRESHOLD * 2);

        let mut parallel = data.clone();
        ecb_in_place(&mut parallel, &schedule, Direction::Encrypt)?;

        for (chunk, enc) in data.chunks(BLOCK_SIZE).zip(parallel.chunks(BLOCK_SIZE)) {
            assert_eq!(schedule.encrypt_block(&load_block(chunk)), enc);
        }

        ecb_in_place(&mut parallel, &schedule, Direction::Decrypt)?;
        assert_eq!(parallel, data);
        Ok(())
    }

    #[test]
    fn rejects_unaligned_without_touching_buffer() -> Result<()> {
        let mut buf = PLAINTEXT[..15].to_vec();
        let result = ecb_in_place(&mut buf, &schedule()?, Direction::Encrypt);
        assert!(matches!(result, Err(Error::InvalidBlockAlignment { len: 15, .. })));
        assert_eq!(buf, PLAINTEXT[..15]);
        Ok(())
    }
}
