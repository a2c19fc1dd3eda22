//! Constant-time AES S-box.
//!
//! The substitution is computed arithmetically instead of read from a 256-entry table, so the
//! memory access pattern never depends on key or plaintext bytes:
//! `S(x) = A(x^254) ^ 0x63`, where `x^254` is the multiplicative inverse in GF(2^8)
//! (with 0 mapping to 0) and `A` is the AES affine map.

use super::util::dbl;

/// Multiply two elements of GF(2^8) modulo x^8 + x^4 + x^3 + x + 1 without branching.
#[inline(always)]
fn gf_mul(mut a: u8, mut b: u8) -> u8 {
    let mut p = 0u8;
    for _ in 0..8 {
        // mask is 0xFF when the low bit of b is set, 0x00 otherwise
        p ^= a & (b & 1).wrapping_neg();
        a = dbl(a);
        b >>= 1;
    }
    p
}

/// Multiplicative inverse as x^254. Always runs the full addition chain, including for zero.
#[inline(always)]
fn gf_inv(x: u8) -> u8 {
    let x2 = gf_mul(x, x);
    let x3 = gf_mul(x2, x);
    let x6 = gf_mul(x3, x3);
    let x12 = gf_mul(x6, x6);
    let x15 = gf_mul(x12, x3);
    let x30 = gf_mul(x15, x15);
    let x60 = gf_mul(x30, x30);
    let x120 = gf_mul(x60, x60);
    let x240 = gf_mul(x120, x120);
    let x252 = gf_mul(x240, x12);
    gf_mul(x252, x2)
}

/// Forward S-box: inverse followed by the affine map.
#[inline(always)]
pub(crate) fn sbox(x: u8) -> u8 {
    let i = gf_inv(x);
    i ^ i.rotate_left(1) ^ i.rotate_left(2) ^ i.rotate_left(3) ^ i.rotate_left(4) ^ 0x63
}

/// Inverse S-box: undo the affine map, then invert.
#[inline(always)]
pub(crate) fn sbox_inv(x: u8) -> u8 {
    let y = x ^ 0x63;
    gf_inv(y.rotate_left(1) ^ y.rotate_left(3) ^ y.rotate_left(6))
}
