//! The redeem codec: parsing and emitting Boost unlocking scripts,
//! and the pre-signing size estimator used to size a redeem transaction's
//! fee before a signature exists.

use crate::error::{Error, Result};
use crate::field::{Bytes, Digest20, Int32LE, UInt32BE, UInt32LE};
use crate::script::{Chunk, Script};
use crate::work::Solution;

/// A parsed or constructed unlocking script for a Boost output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redeem {
    /// The DER signature plus trailing sighash-type byte.
    pub signature: Bytes,
    /// The redeeming miner's public key, compressed (33 bytes) or
    /// uncompressed (65).
    pub miner_pub_key: Bytes,
    /// The proof-of-work solution fields.
    pub solution: Solution,
    /// The miner's public-key hash, present iff the job being redeemed is
    /// bounty-form (the miner chooses the address at redeem time; for a
    /// contract job the hash is already committed in the locking script).
    pub miner_pub_key_hash: Option<Digest20>,
}

impl Redeem {
    /// Parses an unlocking script. `is_bounty`/`is_v2` must be known from
    /// the `Job` this redeem answers — an unlocking script alone does not
    /// self-describe its shape: it's parsed in the context of a decoded
    /// Job.
    pub fn from_unlocking_script(bytes: &[u8], is_bounty: bool, is_v2: bool) -> Result<Redeem> {
        let script = Script::from_bytes(bytes)?;
        let chunks = script.chunks();

        let mut i = 0usize;
        let signature = next_push(chunks, &mut i)?.to_vec();
        let pubkey = next_push(chunks, &mut i)?.to_vec();
        if pubkey.len() != 33 && pubkey.len() != 65 {
            return Err(Error::BadLength { expected: 33, actual: pubkey.len() });
        }
        let nonce = UInt32LE::from_bytes(next_push(chunks, &mut i)?)?;
        let general_purpose_bits =
            if is_v2 { Some(Int32LE::from_bytes(next_push(chunks, &mut i)?)?) } else { None };
        let time = UInt32LE::from_bytes(next_push(chunks, &mut i)?)?;
        let extra_nonce_2 = Bytes::new(next_push(chunks, &mut i)?.to_vec());
        let extra_nonce_1 = UInt32BE::from_bytes(next_push(chunks, &mut i)?)?;
        let miner_pub_key_hash =
            if is_bounty { Some(Digest20::from_bytes(next_push(chunks, &mut i)?)?) } else { None };

        let solution = Solution::new(time, extra_nonce_1, extra_nonce_2, nonce, general_purpose_bits)?;

        Ok(Redeem { signature: Bytes::new(signature), miner_pub_key: Bytes::new(pubkey), solution, miner_pub_key_hash })
    }

    /// Emits this redeem's unlocking script bytes, in the fixed field
    /// order with the v2 `gpr` push immediately after `nonce`.
    #[must_use]
    pub fn to_unlocking_script(&self) -> Vec<u8> {
        let mut s = Script::new();
        s.push(self.signature.as_slice());
        s.push(self.miner_pub_key.as_slice());
        s.push(&self.solution.nonce.to_bytes());
        if let Some(gpr) = self.solution.general_purpose_bits {
            s.push(&gpr.to_bytes());
        }
        s.push(&self.solution.time.to_bytes());
        s.push(self.solution.extra_nonce_2.as_slice());
        s.push(&self.solution.extra_nonce_1.to_bytes());
        if let Some(hash) = &self.miner_pub_key_hash {
            s.push(&hash.to_bytes());
        }
        s.to_bytes()
    }

    /// The actual size of this redeem's unlocking script.
    #[must_use]
    pub fn size(&self) -> usize {
        self.to_unlocking_script().len()
    }
}

/// The pre-signing size estimate for an unlocking script of the given
/// shape: one byte of push overhead per field (every field here is
/// small enough for a direct, single-byte-length push), a maximum-size DER
/// signature, and the chosen pubkey/extraNonce2/form widths.
#[must_use]
pub fn estimate_size(is_bounty: bool, is_v2: bool, extra_nonce_2_len: usize, pubkey_compressed: bool) -> usize {
    let pushed = |len: usize| 1 + len;
    let pubkey_len = if pubkey_compressed { 33 } else { 65 };
    let extra_nonce_2_len = if is_v2 { extra_nonce_2_len } else { 8 };

    pushed(73) // signature: max-size DER + 1 sighash byte
        + pushed(pubkey_len)
        + pushed(4) // nonce
        + if is_v2 { pushed(4) } else { 0 } // gpr
        + pushed(4) // time
        + pushed(extra_nonce_2_len)
        + pushed(4) // extraNonce1
        + if is_bounty { pushed(20) } else { 0 }
}

fn next_push<'a>(chunks: &'a [Chunk], i: &mut usize) -> Result<&'a [u8]> {
    let chunk = chunks.get(*i).ok_or_else(|| Error::BadScript {
        reason: "unlocking script ended before all redeem fields were read".to_string(),
        offset: Some(*i),
    })?;
    *i += 1;
    chunk.as_push().ok_or_else(|| {
        log::debug!("rejecting unlocking script: expected a push at position {}", *i - 1);
        Error::BadScript {
            reason: format!("expected a push at position {}", *i - 1),
            offset: Some(*i - 1),
        }
    })
}
