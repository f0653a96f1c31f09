//! Fixed-width little/big-endian integer fields.
//!
//! Each wrapper bakes its endianness into the type, so passing a
//! `UInt32LE` where a `UInt32BE` is expected (the category field in the
//! PoW string vs. `extra_nonce_1` in the metadata preimage, say) is a
//! compile error rather than a silent wire-format bug.

use crate::error::{Error, Result};

macro_rules! fixed_int {
    ($name:ident, $inner:ty, $size:expr, $from_bytes:ident, $to_bytes:ident) => {
        #[doc = concat!("A ", stringify!($size), "-byte ", stringify!($inner), " field.")]
        #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name($inner);

        impl $name {
            /// Wraps a native integer.
            #[must_use]
            pub fn new(value: $inner) -> Self {
                $name(value)
            }

            /// Reads from an exact-size byte buffer.
            pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
                let arr: [u8; $size] =
                    bytes
                        .try_into()
                        .map_err(|_| Error::BadLength { expected: $size, actual: bytes.len() })?;
                Ok($name(<$inner>::$from_bytes(arr)))
            }

            /// Writes to the field's fixed-width wire encoding.
            #[must_use]
            pub fn to_bytes(self) -> [u8; $size] {
                self.0.$to_bytes()
            }

            /// The field's numeric value.
            #[must_use]
            pub fn to_number(self) -> $inner {
                self.0
            }

            /// Width in bytes of this field, for callers building offsets.
            pub const SIZE: usize = $size;
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                $name(value)
            }
        }

        impl From<$name> for $inner {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

fixed_int!(Int32LE, i32, 4, from_le_bytes, to_le_bytes);
fixed_int!(UInt32LE, u32, 4, from_le_bytes, to_le_bytes);
fixed_int!(UInt32BE, u32, 4, from_be_bytes, to_be_bytes);
fixed_int!(UInt16LE, u16, 2, from_le_bytes, to_le_bytes);

impl UInt32LE {
    /// Reinterprets this little-endian field as its big-endian twin over
    /// the same bytes (property 4: `bytes.reverse() == UInt32BE` bytes).
    #[must_use]
    pub fn to_be_twin(self) -> UInt32BE {
        UInt32BE::new(u32::from_be_bytes(self.to_bytes()))
    }
}

impl UInt32BE {
    /// Reinterprets this big-endian field as its little-endian twin over
    /// the same bytes.
    #[must_use]
    pub fn to_le_twin(self) -> UInt32LE {
        UInt32LE::new(u32::from_le_bytes(self.to_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endian_sanity() {
        let le = UInt32LE::new(0x0102_0304);
        let mut reversed = le.to_bytes();
        reversed.reverse();
        let be = UInt32BE::from_bytes(&reversed).unwrap();
        assert_eq!(be.to_number(), le.to_number());
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(matches!(
            UInt32LE::from_bytes(&[1, 2, 3]),
            Err(Error::BadLength { expected: 4, actual: 3 })
        ));
    }

    #[test]
    fn int32_le_round_trip() {
        let n = Int32LE::new(-5);
        let bytes = n.to_bytes();
        assert_eq!(Int32LE::from_bytes(&bytes).unwrap(), n);
    }
}
