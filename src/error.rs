//! The error taxonomy shared by every codec and state-machine operation in
//! this crate.
//!
//! Nothing here is retried internally: callers get a typed [`Error`] back
//! and decide what to do with it.

use thiserror::Error;

/// Everything that can go wrong while parsing, building or verifying a
/// Boost job, redeem or proof.
#[derive(Debug, Error)]
pub enum Error {
    /// A fixed-width field (or a script field with a fixed expected width)
    /// was constructed from the wrong number of bytes.
    #[error("expected {expected} bytes, found {actual}")]
    BadLength {
        /// The width the field requires.
        expected: usize,
        /// The width actually supplied.
        actual: usize,
    },

    /// A locking or unlocking script did not match either of the known
    /// templates.
    #[error("malformed script{}: {reason}", offset.map(|o| format!(" at byte {o}")).unwrap_or_default())]
    BadScript {
        /// Human-readable description of what failed to parse.
        reason: String,
        /// Byte offset into the script at which the mismatch was detected,
        /// when known.
        offset: Option<usize>,
    },

    /// The compact `bits` field encodes a non-positive or oversized target.
    #[error("bits encode a non-positive or oversized target")]
    BadTarget,

    /// `solution.generalPurposeBits.is_some()` did not match
    /// `puzzle.mask.is_some()`.
    #[error("solution's general-purpose-bits presence does not match the puzzle's mask")]
    BadSolution,

    /// The PoW header hash did not beat the claimed target.
    #[error("proof-of-work hash does not beat the target")]
    InvalidProof,

    /// A `Puzzle` was constructed for a contract-form output with a key
    /// whose address does not equal the job's committed `minerPubKeyHash`.
    #[error("miner key does not match the job's committed public-key hash")]
    InvalidPuzzle,

    /// The estimated fee for a redeem transaction is not smaller than the
    /// output being spent.
    #[error("estimated fee {fee} sats is not less than the output value {value} sats")]
    InsufficientFunds {
        /// The fee the builder computed.
        fee: u64,
        /// The value of the output being redeemed.
        value: u64,
    },

    /// The ECDSA signing primitive rejected a key or message.
    #[error("signing failed: {0}")]
    SignatureFailure(#[from] secp256k1::Error),

    /// A redeem transaction was requested for an `Output` with no attached
    /// `txid`/`vout`/`value`.
    #[error("redeem transaction requires an attached output (txid, vout, value)")]
    AttachmentMissing,
}

/// Shorthand for a `Result` with this crate's `Error` type.
pub type Result<T> = std::result::Result<T, Error>;
