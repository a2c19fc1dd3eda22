/// Round constants for the AES-256 key schedule, indexed by `i / Nk`. Index 0 is never used.
pub(crate) const RCON: [u8; 8] = [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40];

/// Number of rounds for a 256-bit key.
pub(crate) const NR: usize = 14;

/// Number of 32-bit words in a 256-bit key.
pub(crate) const NK: usize = 8;

/// Number of words produced by the key schedule, (Nr + 1) * 4.
pub(crate) const NW: usize = (NR + 1) * 4;
