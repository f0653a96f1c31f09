//! The job codec: parsing and emitting Boost locking scripts, and
//! the derived views a caller needs without re-parsing (`is_contract`,
//! `script_version`, `magic_number`, `script_hash`).

pub mod body;

use crate::error::{Error, Result};
use crate::field::{Bytes, Difficulty, Digest20, Digest32, Int32LE, UInt32LE};
use crate::hash;
use crate::script::{bytes_of, opcodes, Chunk, Script};

/// The literal tag every Boost locking script opens with.
pub const TAG: &[u8] = b"boostpow";

/// The ASICBoost general-purpose-bits mask, little-endian bytes
/// `ff1f00e0`.
pub const GPR_MASK: u32 = 0xe000_1fff;

/// A job's attachment to the transaction it was read from — set only by
/// the decoder that parsed the owning transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    /// The transaction id of the output carrying this job.
    pub txid: Digest32,
    /// The output index within that transaction.
    pub vout: u32,
    /// The output's value, in satoshis.
    pub value: u64,
}

/// The fields common to both bounty- and contract-form jobs.
#[derive(Clone, Debug, PartialEq)]
pub struct Fields {
    /// The 32-byte content digest being boosted.
    pub content: Digest32,
    /// The claimed proof-of-work difficulty.
    pub diff: Difficulty,
    /// The category word (the PoW string's "version" slot).
    pub category: Int32LE,
    /// A buyer-controlled tag of at most 20 bytes.
    pub tag: Bytes,
    /// A buyer-controlled nonce.
    pub user_nonce: UInt32LE,
    /// Arbitrary buyer-controlled trailing data.
    pub additional_data: Bytes,
    /// Whether this job uses the v2 (ASICBoost) script body.
    pub use_general_purpose_bits: bool,
    /// The owning transaction's txid/vout/value, if this job was read
    /// from a transaction rather than built via [`Job::from_template`].
    pub attached: Option<Attachment>,
}

/// A parsed or constructed Boost job: a bounty (any miner may redeem) or a
/// contract (redemption is bound to a specific miner's public-key hash).
#[derive(Clone, Debug, PartialEq)]
pub enum Job {
    /// A bounty-form job: `minerPubKeyHash` is absent from the locking
    /// script and is supplied by the redeeming miner.
    Bounty(Fields),
    /// A contract-form job: the locking script commits to a specific
    /// miner's public-key hash.
    Contract(Fields, Digest20),
}

impl Job {
    /// The fields common to both variants.
    #[must_use]
    pub fn fields(&self) -> &Fields {
        match self {
            Job::Bounty(f) | Job::Contract(f, _) => f,
        }
    }

    /// `Some(hash)` for a contract-form job, `None` for a bounty.
    #[must_use]
    pub fn miner_pub_key_hash(&self) -> Option<&Digest20> {
        match self {
            Job::Bounty(_) => None,
            Job::Contract(_, hash) => Some(hash),
        }
    }

    /// `true` iff this job is contract-form.
    #[must_use]
    pub fn is_contract(&self) -> bool {
        self.miner_pub_key_hash().is_some()
    }

    /// `true` iff this job is bounty-form.
    #[must_use]
    pub fn is_bounty(&self) -> bool {
        !self.is_contract()
    }

    /// `1` for the plain body, `2` for the ASICBoost body.
    #[must_use]
    pub fn script_version(&self) -> u8 {
        if self.fields().use_general_purpose_bits {
            2
        } else {
            1
        }
    }

    /// The 16 bits of `category` not committed by the body's arithmetic:
    /// in v1 this is simply the low 16 bits; in v2 it is the contiguous
    /// 16-bit field the ASICBoost mask leaves free (bits 13..28, the same
    /// span BIP-320 version-rolling uses), shifted down into a plain
    /// `u16` rather than just masked.
    #[must_use]
    pub fn magic_number(&self) -> u16 {
        let category = self.fields().category.to_number() as u32;
        if self.fields().use_general_purpose_bits {
            ((category & !GPR_MASK) >> 13) as u16
        } else {
            (category & 0xffff) as u16
        }
    }

    /// `little-endian-hex(sha256(scriptBytes))`, a stable identifier for
    /// this job independent of which transaction carries it.
    #[must_use]
    pub fn script_hash(&self) -> String {
        hash::sha256(&self.to_locking_script()).to_hex()
    }

    /// Parses a Boost locking script.
    pub fn from_locking_script(bytes: &[u8]) -> Result<Job> {
        let script = Script::from_bytes(bytes)?;
        let chunks = script.chunks();

        if chunks.len() < 3 {
            return Err(bad("script too short to be a Boost output", Some(0)));
        }
        let tag = push_at(chunks, 0)?;
        if tag != TAG {
            return Err(bad("missing \"boostpow\" tag push", Some(0)));
        }
        match chunks[1] {
            Chunk::Op(op) if op == opcodes::OP_DROP => {}
            _ => return Err(bad("expected OP_DROP at position 1", Some(1))),
        }

        let third = push_at(chunks, 2)?;
        let (is_contract, prefix_len) = match third.len() {
            4 => (false, 8),
            20 => (true, 9),
            n => return Err(bad(&format!("unexpected push length {n} at position 2"), Some(2))),
        };
        if chunks.len() < prefix_len {
            return Err(bad("script truncated before body", Some(chunks.len())));
        }

        let (miner_pub_key_hash, category, content, target, tag_field, user_nonce, additional_data) =
            if is_contract {
                (
                    Some(Digest20::from_bytes(third)?),
                    push_at(chunks, 3)?,
                    push_at(chunks, 4)?,
                    push_at(chunks, 5)?,
                    push_at(chunks, 6)?,
                    push_at(chunks, 7)?,
                    push_at(chunks, 8)?,
                )
            } else {
                (
                    None,
                    third,
                    push_at(chunks, 3)?,
                    push_at(chunks, 4)?,
                    push_at(chunks, 5)?,
                    push_at(chunks, 6)?,
                    push_at(chunks, 7)?,
                )
            };

        if tag_field.len() > 20 {
            return Err(Error::BadLength { expected: 20, actual: tag_field.len() });
        }

        let body_bytes = bytes_of(&chunks[prefix_len..]);
        let use_general_purpose_bits = if body_bytes == body::BODY_V1 {
            false
        } else if body_bytes == body::BODY_V2 {
            true
        } else {
            return Err(bad("script tail matches neither BODY_V1 nor BODY_V2", Some(prefix_len)));
        };

        let fields = Fields {
            content: Digest32::from_bytes(content)?,
            diff: Difficulty::from_compact_bytes(
                target.try_into().map_err(|_| Error::BadLength { expected: 4, actual: target.len() })?,
            )?,
            category: Int32LE::from_bytes(category)?,
            tag: Bytes::new(tag_field.to_vec()),
            user_nonce: UInt32LE::from_bytes(user_nonce)?,
            additional_data: Bytes::new(additional_data.to_vec()),
            use_general_purpose_bits,
            attached: None,
        };

        Ok(match miner_pub_key_hash {
            Some(hash) => Job::Contract(fields, hash),
            None => Job::Bounty(fields),
        })
    }

    /// Emits this job's locking script bytes (the inverse of
    /// [`Job::from_locking_script`]).
    #[must_use]
    pub fn to_locking_script(&self) -> Vec<u8> {
        let fields = self.fields();
        let mut s = Script::new();
        s.push(TAG);
        s.push_opcode(opcodes::OP_DROP);
        if let Job::Contract(_, hash) = self {
            s.push(&hash.to_bytes());
        }
        s.push(&fields.category.to_bytes());
        s.push(&fields.content.to_bytes());
        s.push(&fields.diff.to_compact_bytes());
        s.push(fields.tag.as_slice());
        s.push(&fields.user_nonce.to_bytes());
        s.push(fields.additional_data.as_slice());
        let body = if fields.use_general_purpose_bits { body::BODY_V2 } else { body::BODY_V1 };
        s.extend_bytes(body).expect("BODY_V1/BODY_V2 are well-formed scripts");
        s.to_bytes()
    }
}

/// The JSON job form, and a structured builder for it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(actual_serde::Serialize, actual_serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(crate = "actual_serde"))]
pub struct JobTemplate {
    /// Hex-encoded 32-byte content digest.
    pub content: String,
    /// The claimed difficulty ratio.
    pub diff: f64,
    /// Hex-encoded 4-byte category, default all-zero.
    pub category: Option<String>,
    /// Hex-encoded tag of at most 20 bytes, default empty.
    pub tag: Option<String>,
    /// Hex-encoded trailing data, default empty.
    pub additional_data: Option<String>,
    /// Hex-encoded 4-byte user nonce. This codec has no RNG dependency of
    /// its own; a caller wanting a random default generates it before
    /// building the template. Leaving this `None` builds an all-zero
    /// nonce.
    pub user_nonce: Option<String>,
    /// Hex-encoded 20-byte miner public-key hash: present iff the job is
    /// contract-form.
    pub miner_pub_key_hash: Option<String>,
    /// Selects the v2 (ASICBoost) body. Default `false`.
    pub use_general_purpose_bits: Option<bool>,
}

impl JobTemplate {
    /// Builds the `Job` this template describes.
    pub fn into_job(self) -> Result<Job> {
        let content = Digest32::from_hex(&self.content)?;
        let diff = Difficulty::from_number(self.diff)?;
        let category =
            Int32LE::from_bytes(&crate::field::create_buffer_and_pad(self.category.as_deref().unwrap_or(""), 4, false)?)?;
        let tag_bytes = Bytes::from_hex(self.tag.as_deref().unwrap_or(""))?;
        if tag_bytes.len() > 20 {
            return Err(Error::BadLength { expected: 20, actual: tag_bytes.len() });
        }
        let additional_data = Bytes::from_hex(self.additional_data.as_deref().unwrap_or(""))?;
        let user_nonce = UInt32LE::from_bytes(&crate::field::create_buffer_and_pad(
            self.user_nonce.as_deref().unwrap_or(""),
            4,
            false,
        )?)?;
        let use_general_purpose_bits = self.use_general_purpose_bits.unwrap_or(false);

        let fields = Fields {
            content,
            diff,
            category,
            tag: tag_bytes,
            user_nonce,
            additional_data,
            use_general_purpose_bits,
            attached: None,
        };

        match self.miner_pub_key_hash {
            Some(hex) => Ok(Job::Contract(fields, Digest20::from_hex(&hex)?)),
            None => Ok(Job::Bounty(fields)),
        }
    }
}

fn push_at(chunks: &[Chunk], i: usize) -> Result<&[u8]> {
    chunks
        .get(i)
        .and_then(Chunk::as_push)
        .ok_or_else(|| bad(&format!("expected a push at position {i}"), Some(i)))
}

fn bad(reason: &str, offset: Option<usize>) -> Error {
    log::debug!("rejecting locking script: {reason}");
    Error::BadScript { reason: reason.to_string(), offset }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fields() -> Fields {
        Fields {
            content: Digest32::from_array([0x11; 32]),
            diff: Difficulty::from_compact(0x1d00_ffff).unwrap(),
            category: Int32LE::new(0),
            tag: Bytes::new(vec![0u8; 20]),
            user_nonce: UInt32LE::new(0),
            additional_data: Bytes::new(vec![0u8; 32]),
            use_general_purpose_bits: false,
            attached: None,
        }
    }

    #[test]
    fn bounty_round_trips() {
        let job = Job::Bounty(sample_fields());
        let script = job.to_locking_script();
        let parsed = Job::from_locking_script(&script).unwrap();
        assert_eq!(parsed, job);
        assert!(parsed.is_bounty());
    }

    #[test]
    fn contract_round_trips() {
        let hash = Digest20::from_array([0x22; 20]);
        let job = Job::Contract(sample_fields(), hash);
        let script = job.to_locking_script();
        let parsed = Job::from_locking_script(&script).unwrap();
        assert_eq!(parsed, job);
        assert!(parsed.is_contract());
        assert_eq!(parsed.miner_pub_key_hash(), Some(&hash));
    }

    #[test]
    fn v2_round_trips_and_sets_the_flag() {
        let mut fields = sample_fields();
        fields.use_general_purpose_bits = true;
        let job = Job::Bounty(fields);
        let script = job.to_locking_script();
        let parsed = Job::from_locking_script(&script).unwrap();
        assert!(parsed.fields().use_general_purpose_bits);
        assert_eq!(parsed.to_locking_script(), script);
    }

    #[test]
    fn rejects_a_script_with_no_boostpow_tag() {
        let mut s = Script::new();
        s.push(b"nope");
        s.push_opcode(opcodes::OP_DROP);
        assert!(Job::from_locking_script(&s.to_bytes()).is_err());
    }

    #[test]
    fn template_builds_a_bounty_job_with_defaults() {
        let template = JobTemplate {
            content: "11".repeat(32),
            diff: 1.0,
            category: None,
            tag: None,
            additional_data: None,
            user_nonce: None,
            miner_pub_key_hash: None,
            use_general_purpose_bits: None,
        };
        let job = template.into_job().unwrap();
        assert!(job.is_bounty());
        assert!(job.fields().tag.is_empty());
    }

    #[test]
    fn v1_magic_number_is_the_low_16_bits_of_category() {
        let mut fields = sample_fields();
        fields.category = Int32LE::new(0x1234_5678);
        let job = Job::Bounty(fields);
        assert_eq!(job.magic_number(), 0x5678);
    }

    #[test]
    fn v2_magic_number_recovers_the_full_16_bit_free_field() {
        let mut fields = sample_fields();
        fields.use_general_purpose_bits = true;
        // All 16 free bits (13..28) set, everything under the mask clear.
        fields.category = Int32LE::new(0x1fff_e000u32 as i32);
        let job = Job::Bounty(fields);
        assert_eq!(job.magic_number(), 0xffff);
    }
}
