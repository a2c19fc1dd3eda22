use zeroize::{Zeroize, ZeroizeOnDrop};

use super::backend::Backend;
use super::constants::{NK, NR, NW, RCON};
use super::sbox::sbox;
use super::{Block, RoundKeys, decryption, encryption};
use crate::key::Key;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
use super::aesni;

/// Expanded AES-256 key bound to a block backend. Immutable once built, so one schedule can be
/// shared by any number of threads and streams. All key material is wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub(crate) struct KeySchedule {
    round_keys: RoundKeys,
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    inv_round_keys: RoundKeys,
    #[zeroize(skip)]
    backend: Backend,
}

impl KeySchedule {
    /// Expands `key` for `backend`, falling back to software if the backend is unavailable.
    pub(crate) fn new(key: &Key, backend: Backend) -> Self {
        let round_keys = expand_key(key);
        Self {
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            inv_round_keys: inverse_schedule(&round_keys),
            round_keys,
            backend: backend.or_software(),
        }
    }

    #[cfg(test)]
    pub(crate) fn software(key: &Key) -> Self {
        Self::new(key, Backend::Software)
    }

    pub(crate) fn round_keys(&self) -> &RoundKeys {
        &self.round_keys
    }

    pub(crate) fn backend(&self) -> Backend {
        self.backend
    }

    #[inline(always)]
    pub(crate) fn encrypt_block(&self, block: &Block) -> Block {
        match self.backend {
            Backend::Software => encryption::encrypt_block(block, &self.round_keys),
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            // SAFETY: construction only keeps AesNi when the CPU reports aes and sse2.
            Backend::AesNi => unsafe { aesni::encrypt_block(block, &self.round_keys) },
        }
    }

    #[inline(always)]
    pub(crate) fn decrypt_block(&self, block: &Block) -> Block {
        match self.backend {
            Backend::Software => decryption::decrypt_block(block, &self.round_keys),
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            // SAFETY: as in encrypt_block.
            Backend::AesNi => unsafe { aesni::decrypt_block(block, &self.inv_round_keys) },
        }
    }
}

/// AES-256 key schedule. Returns 15 round keys; the first is the key's first half.
fn expand_key(key: &Key) -> RoundKeys {
    let key = key.as_bytes();

    // Variable names match FIPS-197, NIST specification: https://doi.org/10.6028/NIST.FIPS.197-upd1
    // Nk   The number of 32-bit words comprising the key (8)
    // Nr   The number of rounds (14)
    // w    The result of the key schedule, an array of words that form round keys
    // Nw   The total number of words generated by the key schedule (including initial key)
    let mut w = [[0u8; 4]; NW];

    // first Nk words of w are filled with the initial key
    for (i, byte) in key.iter().enumerate() {
        w[i / 4][i % 4] = *byte;
    }

    let mut temp = w[NK - 1];
    for i in NK..NW {
        if i % NK == 0 {
            // rot_word, sub_word, and rcon on temp
            temp = [
                sbox(temp[1]) ^ RCON[i / NK],
                sbox(temp[2]),
                sbox(temp[3]),
                sbox(temp[0]),
            ];
        } else if i % NK == 4 {
            // additional substitution on temp for 256-bit keys
            temp = [sbox(temp[0]), sbox(temp[1]), sbox(temp[2]), sbox(temp[3])];
        }

        // w[i] = temp ⊕ w[i − Nk]
        for b in 0..4 {
            w[i][b] = temp[b] ^ w[i - NK][b];
        }
        temp = w[i];
    }

    // group words into column-major 16-byte round keys
    let mut round_keys = [[0u8; 16]; NR + 1];
    for (round, round_key) in round_keys.iter_mut().enumerate() {
        for col in 0..4 {
            round_key[col * 4..col * 4 + 4].copy_from_slice(&w[round * 4 + col]);
        }
    }

    temp.zeroize();
    w.zeroize();
    round_keys
}

/// Equivalent inverse cipher schedule (FIPS-197 5.3.5): round keys in reverse order with
/// InvMixColumns applied to every key except the first and last.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn inverse_schedule(round_keys: &RoundKeys) -> RoundKeys {
    let mut inv = [[0u8; 16]; NR + 1];
    for (i, inv_key) in inv.iter_mut().enumerate() {
        *inv_key = round_keys[NR - i];
        if i != 0 && i != NR {
            decryption::mix_columns_inv(inv_key);
        }
    }
    inv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    // FIPS-197 Appendix A.3
    const KEY_256: [u8; 32] = [
        0x60, 0x3d, 0xeb, 0x10, 0x15, 0xca, 0x71, 0xbe, 0x2b, 0x73, 0xae, 0xf0, 0x85, 0x7d, 0x77,
        0x81, 0x1f, 0x35, 0x2c, 0x07, 0x3b, 0x61, 0x08, 0xd7, 0x2d, 0x98, 0x10, 0xa3, 0x09, 0x14,
        0xdf, 0xf4,
    ];

    #[test]
    fn key_schedule_256() -> Result<()> {
        let key = Key::try_from_slice(&KEY_256)?;
        let round_keys = expand_key(&key);

        // first two round keys are the key itself
        assert_eq!(round_keys[0], KEY_256[..16]);
        assert_eq!(round_keys[1], KEY_256[16..]);

        // w[8..12]
        let expected_2: [u8; 16] = [
            0x9b, 0xa3, 0x54, 0x11, 0x8e, 0x69, 0x25, 0xaf, 0xa5, 0x1a, 0x8b, 0x5f, 0x20, 0x67,
            0xfc, 0xde,
        ];
        assert_eq!(round_keys[2], expected_2);

        // w[56..60]
        let expected_last: [u8; 16] = [
            0xfe, 0x48, 0x90, 0xd1, 0xe6, 0x18, 0x8d, 0x0b, 0x04, 0x6d, 0xf3, 0x44, 0x70, 0x6c,
            0x63, 0x1e,
        ];
        assert_eq!(round_keys[NR], expected_last);
        Ok(())
    }

    #[test]
    fn key_schedule_is_deterministic() -> Result<()> {
        let a = KeySchedule::software(&Key::try_from_slice(&KEY_256)?);
        let b = KeySchedule::software(&Key::try_from_slice(&KEY_256)?);
        assert_eq!(a.round_keys(), b.round_keys());
        Ok(())
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    #[test]
    fn inverse_schedule_bounds_are_plain_keys() {
        let round_keys = expand_key(&Key::from(KEY_256));
        let inv = inverse_schedule(&round_keys);
        assert_eq!(inv[0], round_keys[NR]);
        assert_eq!(inv[NR], round_keys[0]);
        assert_ne!(inv[1], round_keys[NR - 1]);
    }

    #[test]
    fn detected_backend_matches_software() {
        let key = Key::from(KEY_256);
        let soft = KeySchedule::software(&key);
        let fast = KeySchedule::new(&key, Backend::detect());
        for seed in 0..32u8 {
            let block: Block = std::array::from_fn(|i| seed ^ (i as u8).wrapping_mul(17));
            let encrypted = soft.encrypt_block(&block);
            assert_eq!(fast.encrypt_block(&block), encrypted);
            assert_eq!(fast.decrypt_block(&encrypted), block);
        }
    }
}
