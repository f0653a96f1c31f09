//! Variable-length opaque byte fields (`tag`, `additionalData`,
//! `extraNonce2`, script pushes, …). The empty buffer is a legal value.

use bitcoin_hashes::hex::{FromHex, ToHex};

use crate::error::Result;

/// An owned, variable-length byte buffer.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Bytes(Vec<u8>);

impl Bytes {
    /// Wraps an owned buffer.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Bytes(bytes)
    }

    /// Parses a hex string (the empty string decodes to the empty
    /// buffer).
    pub fn from_hex(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Ok(Bytes(Vec::new()));
        }
        let bytes = Vec::<u8>::from_hex(s)
            .map_err(|_| crate::error::Error::BadLength { expected: s.len() / 2, actual: 0 })?;
        Ok(Bytes(bytes))
    }

    /// Encodes as hex.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }

    /// Borrows the underlying bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Number of bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes `self`, returning the owned buffer.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl std::fmt::Debug for Bytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bytes({})", self.to_hex())
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes(bytes)
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Turns a user-supplied hex string into an exact-width buffer: the hex is
/// decoded, optionally byte-reversed (`big_endian_default`, for hex
/// entered in human/big-endian order that must become our little-endian
/// wire form), then truncated or zero-padded on the right to `size` bytes.
///
/// This is the one sanctioned way a short/long user hex string becomes a
/// fixed-width field; every other constructor in this crate rejects a
/// mismatched length outright.
pub fn create_buffer_and_pad(hex: &str, size: usize, big_endian_default: bool) -> Result<Vec<u8>> {
    let mut bytes = if hex.is_empty() {
        Vec::new()
    } else {
        Vec::<u8>::from_hex(hex)
            .map_err(|_| crate::error::Error::BadLength { expected: size, actual: 0 })?
    };
    if big_endian_default {
        bytes.reverse();
    }
    bytes.resize(size, 0);
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_short_hex_on_the_right() {
        let padded = create_buffer_and_pad("ab", 4, false).unwrap();
        assert_eq!(padded, vec![0xab, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn truncates_long_hex() {
        let padded = create_buffer_and_pad("aabbccddee", 4, false).unwrap();
        assert_eq!(padded, vec![0xaa, 0xbb, 0xcc, 0xdd]);
    }

    #[test]
    fn empty_buffer_is_legal() {
        let b = Bytes::from_hex("").unwrap();
        assert!(b.is_empty());
    }
}
