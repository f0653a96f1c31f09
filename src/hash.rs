//! Thin wrappers around the hash primitives this crate depends on
//! (sha256d, hash160 = ripemd160∘sha256), returning this crate's own
//! digest field types instead of `bitcoin_hashes`' hash newtypes.

use bitcoin_hashes::{hash160, sha256, sha256d, Hash};

use crate::field::{Digest20, Digest32};

/// Double SHA-256, used for the PoW header digest and transaction/sighash
/// hashing.
#[must_use]
pub fn sha256d(data: &[u8]) -> Digest32 {
    Digest32::from_array(sha256d::Hash::hash(data).into_inner())
}

/// Single SHA-256, used only for `Job::script_hash`.
#[must_use]
pub fn sha256(data: &[u8]) -> Digest32 {
    Digest32::from_array(sha256::Hash::hash(data).into_inner())
}

/// `ripemd160(sha256(data))`, Bitcoin's "hash160", used for public-key
/// hashes and P2PKH addresses.
#[must_use]
pub fn hash160(data: &[u8]) -> Digest20 {
    Digest20::from_array(hash160::Hash::hash(data).into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256d_is_deterministic() {
        assert_eq!(sha256d(b"boostpow"), sha256d(b"boostpow"));
        assert_ne!(sha256d(b"boostpow"), sha256d(b"boost"));
    }

    #[test]
    fn hash160_is_twenty_bytes() {
        assert_eq!(hash160(b"anything").to_bytes().len(), 20);
    }
}
