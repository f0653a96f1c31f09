//! `boostpow`: the core codec and proof-of-work state machine for Boost
//! PoW (Bitcoin SV) outputs.
//!
//! This crate is a pure, synchronous codec with no I/O and no hidden
//! state: it translates between Boost locking/unlocking scripts and their
//! structured fields, assembles and validates the synthetic 80-byte
//! proof-of-work header a job+solution pair commits to, and builds the
//! signed redeem transaction that spends a Boost output. Mining (nonce
//! search) is not part of this crate — it verifies proofs, it does not
//! search for them.
//!
//! Module map, leaves first:
//!
//! - [`field`] — fixed-width typed byte fields (`Digest20`, `Digest32`,
//!   `Int32LE`, `UInt32LE`/`UInt32BE`, `UInt16LE`, `Bytes`, `Difficulty`).
//! - [`script`] — the opcode/push primitive scripts are built and parsed
//!   from.
//! - [`job`] — Boost locking-script parsing and synthesis.
//! - [`redeem`] — Boost unlocking-script parsing and synthesis.
//! - [`work`] — the puzzle/solution/PoW-header state machine.
//! - [`tx`] — transaction serialization and BIP-143+FORKID sighash.
//! - [`facade`] — `Output`, `Puzzle`, `Proof`, and the end-to-end redeem
//!   transaction builder that ties the above together.

#![warn(missing_docs)]

pub mod address;
pub mod error;
pub mod facade;
pub mod field;
pub mod hash;
pub mod job;
pub mod redeem;
pub mod script;
pub mod tx;
pub mod work;

pub use error::{Error, Result};
pub use facade::{Output, Proof, Puzzle};
pub use job::Job;
pub use redeem::Redeem;
pub use work::{PowString, Solution};
