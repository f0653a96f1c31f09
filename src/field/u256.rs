//! A minimal 256-bit unsigned integer, just big enough to hold a Bitcoin
//! difficulty target and compare it against a double-SHA256 digest.
//!
//! This mirrors the shape of `rust-bitcoin`'s own `Uint256`/`pow::U256`
//! rather than pulling in a general-purpose bignum crate: Boost only ever
//! needs construction from big/little-endian bytes, shifts, and ordering.

use std::ops::{Shl, Shr};

/// A 256-bit unsigned integer stored as two `u128` limbs, most-significant
/// first.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct U256(u128, u128);

impl U256 {
    /// The zero value.
    pub const ZERO: U256 = U256(0, 0);

    /// Constructs a `U256` directly from its high and low 128-bit limbs.
    #[must_use]
    pub const fn new(high: u128, low: u128) -> Self {
        U256(high, low)
    }

    /// Creates a `U256` from a big-endian array of bytes.
    #[must_use]
    pub fn from_be_bytes(a: &[u8; 32]) -> U256 {
        let (high, low) = split_in_half(a);
        U256(u128::from_be_bytes(high), u128::from_be_bytes(low))
    }

    /// Creates a `U256` from a little-endian array of bytes.
    #[must_use]
    pub fn from_le_bytes(a: &[u8; 32]) -> U256 {
        let (high, low) = split_in_half(a);
        U256(u128::from_le_bytes(low), u128::from_le_bytes(high))
    }

    /// Converts to a big-endian array of bytes.
    #[must_use]
    pub fn to_be_bytes(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out[..16].copy_from_slice(&self.0.to_be_bytes());
        out[16..].copy_from_slice(&self.1.to_be_bytes());
        out
    }

    fn is_zero(&self) -> bool {
        self.0 == 0 && self.1 == 0
    }

    /// Returns the least number of bits needed to represent the number.
    #[must_use]
    pub fn bits(&self) -> u32 {
        if self.0 > 0 {
            256 - self.0.leading_zeros()
        } else {
            128 - self.1.leading_zeros()
        }
    }

    /// Lossy conversion to `f64`, used only at the library/user boundary
    /// when presenting a difficulty ratio — never for target comparisons.
    #[must_use]
    pub fn to_f64_lossy(self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        (self.0 as f64) * 2f64.powi(128) + (self.1 as f64)
    }

    fn wrapping_shl(self, rhs: u32) -> Self {
        let shift = rhs & 0xff;
        let mut ret = U256::ZERO;
        let word_shift = shift >= 128;
        let bit_shift = shift % 128;

        if word_shift {
            ret.0 = self.1 << bit_shift;
        } else {
            ret.0 = self.0 << bit_shift;
            if bit_shift > 0 {
                ret.0 += self.1 >> (128 - bit_shift);
            }
            ret.1 = self.1 << bit_shift;
        }
        ret
    }

    fn wrapping_shr(self, rhs: u32) -> Self {
        let shift = rhs & 0xff;
        let mut ret = U256::ZERO;
        let word_shift = shift >= 128;
        let bit_shift = shift % 128;

        if word_shift {
            ret.1 = self.0 >> bit_shift;
        } else {
            ret.0 = self.0 >> bit_shift;
            ret.1 = self.1 >> bit_shift;
            if bit_shift > 0 {
                ret.1 += self.0 << (128 - bit_shift);
            }
        }
        ret
    }
}

/// Splits a 32 byte array into two 16 byte arrays.
fn split_in_half(a: &[u8; 32]) -> ([u8; 16], [u8; 16]) {
    let mut high = [0u8; 16];
    let mut low = [0u8; 16];
    high.copy_from_slice(&a[..16]);
    low.copy_from_slice(&a[16..]);
    (high, low)
}

impl From<u32> for U256 {
    fn from(x: u32) -> Self {
        U256(0, u128::from(x))
    }
}

impl Shl<u32> for U256 {
    type Output = Self;
    fn shl(self, shift: u32) -> U256 {
        self.wrapping_shl(shift)
    }
}

impl Shr<u32> for U256 {
    type Output = Self;
    fn shr(self, shift: u32) -> U256 {
        self.wrapping_shr(shift)
    }
}
