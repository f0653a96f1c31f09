//! The work puzzle and proof: assembling the synthetic 80-byte PoW header
//! from a [`Puzzle`] and a [`Solution`], and checking it against the
//! claimed difficulty.

use crate::error::{Error, Result};
use crate::field::{Bytes, Difficulty, Digest20, Digest32, Int32LE, UInt32BE, UInt32LE, U256};
use crate::hash;
use crate::job::{Job, GPR_MASK};

/// The miner-supplied fields that, together with a [`Puzzle`], determine a
/// PoW header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    /// The header's claimed time field.
    pub time: UInt32LE,
    /// The Stratum-convention big-endian extra-nonce-1.
    pub extra_nonce_1: UInt32BE,
    /// Miner-chosen extra-nonce-2: exactly 8 bytes for v1, at most 32 for
    /// v2.
    pub extra_nonce_2: Bytes,
    /// The header's claimed nonce field.
    pub nonce: UInt32LE,
    /// The ASICBoost general-purpose-bits word, present iff the puzzle
    /// this solution answers has a mask.
    pub general_purpose_bits: Option<Int32LE>,
}

impl Solution {
    /// Builds a solution, checking `extra_nonce_2`'s width against the
    /// script version (exactly 8 bytes for v1, at most 32 for v2).
    pub fn new(
        time: UInt32LE,
        extra_nonce_1: UInt32BE,
        extra_nonce_2: Bytes,
        nonce: UInt32LE,
        general_purpose_bits: Option<Int32LE>,
    ) -> Result<Self> {
        let max = if general_purpose_bits.is_some() { 32 } else { 8 };
        let exact = general_purpose_bits.is_none();
        if (exact && extra_nonce_2.len() != 8) || extra_nonce_2.len() > max {
            return Err(Error::BadLength { expected: max, actual: extra_nonce_2.len() });
        }
        Ok(Solution { time, extra_nonce_1, extra_nonce_2, nonce, general_purpose_bits })
    }
}

/// The work-level puzzle: the job fields needed to assemble a PoW header,
/// stripped of everything about how the job was encoded as a script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Puzzle {
    /// The category/version word.
    pub category: Int32LE,
    /// The content digest, carried in the header's `prevBlock` slot.
    pub content: Digest32,
    /// The claimed difficulty.
    pub difficulty: Difficulty,
    /// `tag ∥ minerPubKeyHash`.
    pub meta_begin: Bytes,
    /// `userNonce ∥ additionalData`.
    pub meta_end: Bytes,
    /// `Some(GPR_MASK)` for a v2 job, `None` for v1.
    pub mask: Option<u32>,
}

impl Puzzle {
    /// Builds the work-level puzzle for `job`, given the miner public-key
    /// hash that belongs in `metaBegin` — the job's own committed hash for
    /// a contract, or the redeeming miner's address for a bounty. Which
    /// hash is correct for a given job is a facade-level concern;
    /// this constructor just assembles the header fields.
    #[must_use]
    pub fn from_job(job: &Job, miner_pub_key_hash: &Digest20) -> Puzzle {
        let fields = job.fields();

        let mut meta_begin = fields.tag.as_slice().to_vec();
        meta_begin.extend_from_slice(&miner_pub_key_hash.to_bytes());

        let mut meta_end = fields.user_nonce.to_bytes().to_vec();
        meta_end.extend_from_slice(fields.additional_data.as_slice());

        Puzzle {
            category: fields.category,
            content: fields.content,
            difficulty: fields.diff,
            meta_begin: Bytes::new(meta_begin),
            meta_end: Bytes::new(meta_end),
            mask: if fields.use_general_purpose_bits { Some(GPR_MASK) } else { None },
        }
    }
}

/// The 80-byte, Bitcoin-block-header-shaped buffer a (puzzle, solution)
/// pair assembles into.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PowString([u8; 80]);

impl PowString {
    /// Assembles the header. Fails with [`Error::BadSolution`] if the
    /// puzzle's mask and the solution's general-purpose-bits disagree on
    /// whether this is a v2 job.
    pub fn new(puzzle: &Puzzle, solution: &Solution) -> Result<PowString> {
        let version = match (puzzle.mask, solution.general_purpose_bits) {
            (None, None) => puzzle.category.to_bytes(),
            (Some(mask), Some(gpr)) => {
                let category = puzzle.category.to_number() as u32;
                let gpr = gpr.to_number() as u32;
                ((category & mask) | (gpr & !mask)).to_le_bytes()
            }
            _ => return Err(Error::BadSolution),
        };

        let mut preimage = Vec::with_capacity(
            puzzle.meta_begin.len() + 4 + solution.extra_nonce_2.len() + puzzle.meta_end.len(),
        );
        preimage.extend_from_slice(puzzle.meta_begin.as_slice());
        preimage.extend_from_slice(&solution.extra_nonce_1.to_bytes());
        preimage.extend_from_slice(solution.extra_nonce_2.as_slice());
        preimage.extend_from_slice(puzzle.meta_end.as_slice());
        let merkle_root = hash::sha256d(&preimage);

        let mut bytes = [0u8; 80];
        bytes[0..4].copy_from_slice(&version);
        bytes[4..36].copy_from_slice(&puzzle.content.to_bytes());
        bytes[36..68].copy_from_slice(&merkle_root.to_bytes());
        bytes[68..72].copy_from_slice(&solution.time.to_bytes());
        bytes[72..76].copy_from_slice(&puzzle.difficulty.to_compact_bytes());
        bytes[76..80].copy_from_slice(&solution.nonce.to_bytes());
        Ok(PowString(bytes))
    }

    /// The raw 80 bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 80] {
        self.0
    }

    /// `sha256d` of the header, the value compared against the target.
    #[must_use]
    pub fn hash(&self) -> Digest32 {
        hash::sha256d(&self.0)
    }

    /// `true` iff the header's hash, read as a little-endian 256-bit
    /// integer, is strictly less than `difficulty`'s target.
    #[must_use]
    pub fn beats(&self, difficulty: &Difficulty) -> bool {
        U256::from_le_bytes(&self.hash().to_bytes()) < difficulty.target()
    }
}

impl std::fmt::Debug for PowString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PowString({})", hex_of(&self.0))
    }
}

fn hex_of(bytes: &[u8]) -> String {
    use bitcoin_hashes::hex::ToHex;
    bytes.to_vec().to_hex()
}

/// The `share` sub-object of the JSON solution form: the Stratum-style
/// fields a mining pool reports back for a submitted share.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(actual_serde::Serialize, actual_serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(crate = "actual_serde"))]
pub struct ShareTemplate {
    /// Hex-encoded 4-byte header time.
    pub timestamp: String,
    /// Hex-encoded 4-byte header nonce.
    pub nonce: String,
    /// Hex-encoded extra-nonce-2.
    pub extra_nonce_2: String,
    /// Hex-encoded 4-byte general-purpose-bits word, present for a v2 job.
    pub bits: Option<String>,
}

/// The JSON solution form: `{share: {...}, extra_nonce_1}`. Deliberately
/// keeps `extra_nonce_2` distinct from `nonce` rather than deriving one
/// from the other's hex.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(actual_serde::Serialize, actual_serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(crate = "actual_serde"))]
pub struct SolutionTemplate {
    /// The share fields.
    pub share: ShareTemplate,
    /// Hex-encoded 4-byte big-endian extra-nonce-1.
    pub extra_nonce_1: String,
}

impl SolutionTemplate {
    /// Builds the `Solution` this template describes.
    pub fn into_solution(self) -> Result<Solution> {
        let time = UInt32LE::from_bytes(&crate::field::create_buffer_and_pad(&self.share.timestamp, 4, false)?)?;
        let nonce = UInt32LE::from_bytes(&crate::field::create_buffer_and_pad(&self.share.nonce, 4, false)?)?;
        let extra_nonce_1 =
            UInt32BE::from_bytes(&crate::field::create_buffer_and_pad(&self.extra_nonce_1, 4, false)?)?;
        let extra_nonce_2 = Bytes::from_hex(&self.share.extra_nonce_2)?;
        let general_purpose_bits = match self.share.bits {
            Some(hex) => Some(Int32LE::from_bytes(&crate::field::create_buffer_and_pad(&hex, 4, false)?)?),
            None => None,
        };
        Solution::new(time, extra_nonce_1, extra_nonce_2, nonce, general_purpose_bits)
    }

    /// Renders `solution` in the JSON solution form.
    #[must_use]
    pub fn from_solution(solution: &Solution) -> SolutionTemplate {
        use bitcoin_hashes::hex::ToHex;
        SolutionTemplate {
            share: ShareTemplate {
                timestamp: solution.time.to_bytes().to_vec().to_hex(),
                nonce: solution.nonce.to_bytes().to_vec().to_hex(),
                extra_nonce_2: solution.extra_nonce_2.to_hex(),
                bits: solution.general_purpose_bits.map(|b| b.to_bytes().to_vec().to_hex()),
            },
            extra_nonce_1: solution.extra_nonce_1.to_bytes().to_vec().to_hex(),
        }
    }
}

/// Verifies that `solution` answers `puzzle` correctly: assembles the
/// header and checks it beats the puzzle's target.
pub fn verify(puzzle: &Puzzle, solution: &Solution) -> Result<()> {
    let pow = PowString::new(puzzle, solution)?;
    if pow.beats(&puzzle.difficulty) {
        Ok(())
    } else {
        Err(Error::InvalidProof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn easy_puzzle() -> Puzzle {
        Puzzle {
            category: Int32LE::new(0),
            content: Digest32::from_array([0x11; 32]),
            difficulty: Difficulty::from_compact(0x207f_ffff).unwrap(),
            meta_begin: Bytes::new(vec![0u8; 20]),
            meta_end: Bytes::new(vec![0u8; 8]),
            mask: None,
        }
    }

    #[test]
    fn mismatched_gpr_presence_is_bad_solution() {
        let puzzle = easy_puzzle();
        let solution = Solution {
            time: UInt32LE::new(0),
            extra_nonce_1: UInt32BE::new(0),
            extra_nonce_2: Bytes::new(vec![0u8; 8]),
            nonce: UInt32LE::new(0),
            general_purpose_bits: Some(Int32LE::new(0)),
        };
        assert!(matches!(PowString::new(&puzzle, &solution), Err(Error::BadSolution)));
    }

    #[test]
    fn meta_hash_is_deterministic() {
        let puzzle = easy_puzzle();
        let solution = Solution {
            time: UInt32LE::new(1),
            extra_nonce_1: UInt32BE::new(2),
            extra_nonce_2: Bytes::new(vec![3u8; 8]),
            nonce: UInt32LE::new(4),
            general_purpose_bits: None,
        };
        let a = PowString::new(&puzzle, &solution).unwrap();
        let b = PowString::new(&puzzle, &solution).unwrap();
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn rejects_oversized_extra_nonce_2() {
        assert!(Solution::new(
            UInt32LE::new(0),
            UInt32BE::new(0),
            Bytes::new(vec![0u8; 9]),
            UInt32LE::new(0),
            None,
        )
        .is_err());
    }

    #[test]
    fn accepts_v2_extra_nonce_2_up_to_32() {
        assert!(Solution::new(
            UInt32LE::new(0),
            UInt32BE::new(0),
            Bytes::new(vec![0u8; 32]),
            UInt32LE::new(0),
            Some(Int32LE::new(0)),
        )
        .is_ok());
    }

    #[test]
    fn solution_template_round_trips_and_keeps_extra_nonce_2_distinct_from_nonce() {
        let solution = Solution {
            time: UInt32LE::new(0x5e6d_c081),
            extra_nonce_1: UInt32BE::new(0x0a00_000a),
            extra_nonce_2: Bytes::new(vec![0xbf; 8]),
            nonce: UInt32LE::new(0x1ca1_69e0),
            general_purpose_bits: None,
        };
        let template = SolutionTemplate::from_solution(&solution);
        assert_ne!(template.share.extra_nonce_2, template.share.nonce);
        assert_eq!(template.into_solution().unwrap(), solution);
    }
}
