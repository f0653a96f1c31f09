//! Fixed-width digest fields: `Digest20` (`ripemd160(sha256(_))`, used for
//! public-key hashes) and `Digest32` (`sha256d(_)`, used for content and
//! merkle-root fields).
//!
//! Hex is little-endian lexicographic (the internal/wire form); the
//! "reversed hex" methods give the Bitcoin-convention display form used by
//! block explorers and the JSON job schema.

use bitcoin_hashes::hex::{FromHex, ToHex};

use crate::error::{Error, Result};

macro_rules! digest {
    ($name:ident, $size:expr) => {
        #[derive(Copy, Clone, PartialEq, Eq, Hash)]
        pub struct $name([u8; $size]);

        impl $name {
            /// Width in bytes of this digest.
            pub const SIZE: usize = $size;

            /// Wraps a byte array directly.
            #[must_use]
            pub fn from_array(bytes: [u8; $size]) -> Self {
                $name(bytes)
            }

            /// Reads from a byte slice, rejecting any length but `SIZE`.
            pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
                let arr: [u8; $size] = bytes
                    .try_into()
                    .map_err(|_| Error::BadLength { expected: $size, actual: bytes.len() })?;
                Ok($name(arr))
            }

            /// The underlying bytes, in wire (little-endian) order.
            #[must_use]
            pub fn to_bytes(&self) -> [u8; $size] {
                self.0
            }

            /// Parses the internal, little-endian-lexicographic hex form.
            pub fn from_hex(s: &str) -> Result<Self> {
                let bytes = Vec::<u8>::from_hex(s)
                    .map_err(|_| Error::BadLength { expected: $size, actual: s.len() / 2 })?;
                Self::from_bytes(&bytes)
            }

            /// Encodes the internal, little-endian-lexicographic hex form.
            #[must_use]
            pub fn to_hex(&self) -> String {
                self.0.to_vec().to_hex()
            }

            /// Parses the Bitcoin-convention "reversed" display hex form.
            pub fn from_hex_reversed(s: &str) -> Result<Self> {
                let mut d = Self::from_hex(s)?;
                d.0.reverse();
                Ok(d)
            }

            /// Encodes the Bitcoin-convention "reversed" display hex form.
            #[must_use]
            pub fn to_hex_reversed(&self) -> String {
                let mut reversed = self.0;
                reversed.reverse();
                reversed.to_vec().to_hex()
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }
    };
}

digest!(Digest20, 20);
digest!(Digest32, 32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let hex = "35b8fcb6882f93bddb928c9872198bcdf057ab93ed615ad938f24a63abde5881";
        let d = Digest32::from_hex(hex).unwrap();
        assert_eq!(d.to_hex(), hex);
    }

    #[test]
    fn reversed_hex_is_byte_reverse() {
        let hex = "00000000000000000000000000000000000000000000000000000000000000aa";
        let d = Digest32::from_hex(hex).unwrap();
        assert_eq!(&d.to_hex_reversed()[0..2], "aa");
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(Digest20::from_bytes(&[0u8; 19]).is_err());
    }
}
