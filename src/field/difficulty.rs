//! Bitcoin's "compact bits" target encoding, and the difficulty ratio
//! derived from it.
//!
//! `Difficulty` stores the decoded `(mantissa, exponent)` pair rather than
//! re-deriving compact bits from a floating-point ratio on every call, so
//! that `to_compact(from_compact(bits)) == bits` always holds exactly.
//! The floating-point ratio is computed on demand and only ever touches
//! the library/user boundary: target arithmetic is exact (`U256`), the
//! difficulty number is not.

use crate::error::{Error, Result};
use crate::field::u256::U256;

/// `pdiff1`, the historical "difficulty 1" target: compact bits
/// `0x1d00ffff`, i.e. mantissa `0xffff` at exponent `29`.
fn pdiff1_target() -> U256 {
    U256::from(0xffffu32) << (8 * (29 - 3))
}

/// A positive difficulty, convertible to and from Bitcoin's 4-byte compact
/// `bits` encoding.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Difficulty {
    mantissa: u32,
    exponent: u8,
}

impl Difficulty {
    /// Decodes compact `bits` (e.g. as read from a Boost locking script's
    /// target field). Rejects an oversized exponent or a mantissa whose
    /// sign bit is set.
    pub fn from_compact(bits: u32) -> Result<Self> {
        let exponent = (bits >> 24) as u8;
        let mantissa = bits & 0x00ff_ffff;

        if exponent < 1 || exponent > 33 {
            return Err(Error::BadTarget);
        }
        if mantissa & 0x0080_0000 != 0 {
            return Err(Error::BadTarget);
        }

        Ok(Difficulty { mantissa, exponent })
    }

    /// Decodes compact bits from their little-endian wire encoding.
    pub fn from_compact_bytes(bytes: [u8; 4]) -> Result<Self> {
        Self::from_compact(u32::from_le_bytes(bytes))
    }

    /// Re-encodes to the same compact `bits` value this `Difficulty` was
    /// decoded from.
    #[must_use]
    pub fn to_compact(&self) -> u32 {
        (u32::from(self.exponent) << 24) | self.mantissa
    }

    /// Re-encodes to the little-endian wire form.
    #[must_use]
    pub fn to_compact_bytes(&self) -> [u8; 4] {
        self.to_compact().to_le_bytes()
    }

    /// The exact 256-bit target `mantissa * 256^(exponent - 3)`.
    #[must_use]
    pub fn target(&self) -> U256 {
        let mantissa = U256::from(self.mantissa);
        if self.exponent as i32 - 3 >= 0 {
            mantissa << (8 * (u32::from(self.exponent) - 3))
        } else {
            mantissa >> (8 * (3 - u32::from(self.exponent)))
        }
    }

    /// `pdiff1 / target`, as a floating-point ratio. This is the *only*
    /// place floating point enters target arithmetic.
    #[must_use]
    pub fn to_number(&self) -> f64 {
        let target = self.target().to_f64_lossy();
        if target == 0.0 {
            return f64::INFINITY;
        }
        pdiff1_target().to_f64_lossy() / target
    }

    /// Builds the nearest representable `Difficulty` for a user-supplied
    /// ratio (e.g. the `diff` field of the JSON job form). This direction
    /// is inherently approximate: the difficulty/bits round trip is lossy
    /// by design; only `from_compact`/`to_compact` is guaranteed exact.
    pub fn from_number(diff: f64) -> Result<Self> {
        if !(diff > 0.0) || !diff.is_finite() {
            return Err(Error::BadTarget);
        }
        let mut target = pdiff1_target().to_f64_lossy() / diff;
        if !(target > 0.0) {
            return Err(Error::BadTarget);
        }

        let mut exponent: i32 = 3;
        while target >= 256f64.powi(3) && exponent < 33 {
            target /= 256.0;
            exponent += 1;
        }
        while target < 256f64.powi(2) && exponent > 1 {
            target *= 256.0;
            exponent -= 1;
        }

        let mut mantissa = target.round() as u32;
        if mantissa & 0x0080_0000 != 0 {
            mantissa >>= 8;
            exponent += 1;
        }
        if exponent < 1 || exponent > 33 {
            return Err(Error::BadTarget);
        }

        Self::from_compact((exponent as u32) << 24 | mantissa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_genesis_bits() {
        let d = Difficulty::from_compact(0x1d00_ffff).unwrap();
        assert_eq!(d.to_compact(), 0x1d00_ffff);
        assert!((d.to_number() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn round_trips_arbitrary_bits() {
        for bits in [0x1b0404cbu32, 0x1d00ffffu32, 0x207fffffu32, 0x03123456u32] {
            let d = Difficulty::from_compact(bits).unwrap();
            assert_eq!(d.to_compact(), bits);
        }
    }

    #[test]
    fn rejects_negative_mantissa() {
        assert!(Difficulty::from_compact(0x0180_0000).is_err());
    }

    #[test]
    fn rejects_oversized_exponent() {
        assert!(Difficulty::from_compact(0xff00_0000).is_err());
        assert!(Difficulty::from_compact(0x0000_0000).is_err());
    }

    #[test]
    fn endian_bytes_round_trip() {
        let d = Difficulty::from_compact(0x1d00_ffff).unwrap();
        let bytes = d.to_compact_bytes();
        assert_eq!(bytes, [0xff, 0xff, 0x00, 0x1d]);
        assert_eq!(Difficulty::from_compact_bytes(bytes).unwrap(), d);
    }
}
