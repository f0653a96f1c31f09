//! Base58check P2PKH address encode/decode — the one concrete address
//! operation this crate depends on beyond sha256d/ripemd160/ECDSA.
//! Everything else about addresses (WIF, generic base58, CashAddr) is out
//! of scope: Boost spends only to classic base58check P2PKH addresses.

use crate::error::{Error, Result};
use crate::field::Digest20;

/// Mainnet P2PKH version byte.
pub const MAINNET_P2PKH_VERSION: u8 = 0x00;

/// Encodes `hash` as a base58check address under `version`.
#[must_use]
pub fn encode(hash: &Digest20, version: u8) -> String {
    let mut payload = Vec::with_capacity(21);
    payload.push(version);
    payload.extend_from_slice(&hash.to_bytes());
    bs58::encode(payload).with_check().into_string()
}

/// Decodes a base58check P2PKH address into its version byte and
/// public-key hash.
pub fn decode(address: &str) -> Result<(u8, Digest20)> {
    let bytes = bs58::decode(address)
        .with_check(None)
        .into_vec()
        .map_err(|_| Error::BadLength { expected: 21, actual: 0 })?;
    let (version, hash) = bytes.split_first().ok_or(Error::BadLength { expected: 21, actual: 0 })?;
    Ok((*version, Digest20::from_bytes(hash)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_mainnet_address() {
        let hash = Digest20::from_array([0x42; 20]);
        let address = encode(&hash, MAINNET_P2PKH_VERSION);
        let (version, decoded) = decode(&address).unwrap();
        assert_eq!(version, MAINNET_P2PKH_VERSION);
        assert_eq!(decoded, hash);
    }
}
