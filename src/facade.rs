//! The high-level facade: the `Output`/`Puzzle`/`Proof` entities a caller
//! actually works with, and the end-to-end redeem-transaction builder
//! that ties the job, work and transaction codecs together.

use secp256k1::{PublicKey, Secp256k1, SecretKey};
use zeroize::Zeroize;

use crate::error::{Error, Result};
use crate::field::{Bytes, Digest20, Digest32};
use crate::hash;
use crate::job::Job;
use crate::redeem::{estimate_size, Redeem};
use crate::script::{self, opcodes, Script};
use crate::tx::{self, InputScript, OutPoint, Tx, TxInput, TxOutput};
use crate::work::{self, Solution};

/// A Boost job together with the transaction output that carries it.
#[derive(Clone, Debug, PartialEq)]
pub struct Output {
    /// The decoded job.
    pub job: Job,
    /// The owning transaction's id.
    pub txid: Digest32,
    /// The output index within that transaction.
    pub vout: u32,
    /// The output's value, in satoshis.
    pub value: u64,
}

impl Output {
    /// Builds an `Output` from a `Job` that was decoded with its
    /// attachment set (`attached` is set only by the decoder that read
    /// the owning transaction).
    pub fn from_attached_job(job: Job) -> Result<Output> {
        let attachment = job.fields().attached.clone().ok_or(Error::AttachmentMissing)?;
        Ok(Output { txid: attachment.txid, vout: attachment.vout, value: attachment.value, job })
    }
}

/// A private key bound to a Boost `Output`, the key material zeroed on
/// drop: sensitive resources are held only inside `Puzzle` instances.
pub struct Puzzle {
    output: Output,
    secret_key_bytes: [u8; 32],
    miner_pub_key_hash: Digest20,
}

impl Puzzle {
    /// Binds `secret_key` to `output`. For a contract-form job, rejects
    /// (`InvalidPuzzle`) a key whose `hash160(pubkey)` does not equal the
    /// job's committed `minerPubKeyHash`; for a bounty, derives the
    /// redeeming address from the key instead.
    pub fn new(output: Output, secret_key: SecretKey) -> Result<Puzzle> {
        let secp = Secp256k1::signing_only();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        let derived_hash = hash::hash160(&public_key.serialize());

        let miner_pub_key_hash = match output.job.miner_pub_key_hash() {
            Some(committed) if *committed == derived_hash => derived_hash,
            Some(_) => return Err(Error::InvalidPuzzle),
            None => derived_hash,
        };

        Ok(Puzzle { output, secret_key_bytes: secret_key.secret_bytes(), miner_pub_key_hash })
    }

    /// The output this puzzle is bound to.
    #[must_use]
    pub fn output(&self) -> &Output {
        &self.output
    }

    /// The resolved miner public-key hash (the job's own, for a contract;
    /// the one derived from this puzzle's key, for a bounty).
    #[must_use]
    pub fn miner_pub_key_hash(&self) -> &Digest20 {
        &self.miner_pub_key_hash
    }

    fn secret_key(&self) -> Result<SecretKey> {
        SecretKey::from_slice(&self.secret_key_bytes).map_err(Error::SignatureFailure)
    }

    /// Verifies `solution` against this puzzle's job, signs `incomplete`'s
    /// `input_index`-th input over the job's locking script and the
    /// output's value, and returns the unlocking script bytes.
    pub fn redeem(&self, solution: &Solution, incomplete: &Tx, input_index: usize) -> Result<Vec<u8>> {
        let work_puzzle = work::Puzzle::from_job(&self.output.job, &self.miner_pub_key_hash);
        work::verify(&work_puzzle, solution)?;

        let secret_key = self.secret_key()?;
        let secp = Secp256k1::signing_only();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        let locking_script = self.output.job.to_locking_script();
        let signature = tx::sign(incomplete, input_index, &locking_script, self.output.value, &secret_key)?;

        let redeem = Redeem {
            signature: Bytes::new(signature),
            miner_pub_key: Bytes::new(public_key.serialize().to_vec()),
            solution: solution.clone(),
            miner_pub_key_hash: if self.output.job.is_bounty() { Some(self.miner_pub_key_hash) } else { None },
        };
        Ok(redeem.to_unlocking_script())
    }
}

impl Drop for Puzzle {
    fn drop(&mut self) {
        self.secret_key_bytes.zeroize();
    }
}

/// Builds a `P2PKH` locking script: `OP_DUP OP_HASH160 <hash> OP_EQUALVERIFY OP_CHECKSIG`.
#[must_use]
pub fn p2pkh_script(hash: &Digest20) -> Vec<u8> {
    let mut s = Script::new();
    s.push_opcode(opcodes::OP_DUP);
    s.push_opcode(opcodes::OP_HASH160);
    s.push(&hash.to_bytes());
    s.push_opcode(opcodes::OP_EQUALVERIFY);
    s.push_opcode(opcodes::OP_CHECKSIG);
    s.to_bytes()
}

/// Builds an `OP_FALSE OP_RETURN <data...>` script.
#[must_use]
pub fn op_return_script(data: &[&[u8]]) -> Vec<u8> {
    let mut s = Script::new();
    s.push_opcode(opcodes::OP_FALSE);
    s.push_opcode(opcodes::OP_RETURN);
    for chunk in data {
        s.push(chunk);
    }
    s.to_bytes()
}

/// Assembles, fee-sizes, signs and serializes the redeem transaction for
/// `puzzle`'s output:
///
/// 1. builds an incomplete two-output tx paying `receive_pub_key_hash`
///    (0 sats, sized later) and carrying `op_return` as an `OP_RETURN`
///    output;
/// 2. estimates the fee at `sats_per_byte` and fails
///    ([`Error::InsufficientFunds`]) if it would not leave a positive
///    output value;
/// 3. signs and emits the real unlocking script;
/// 4. serializes the complete transaction.
pub fn create_redeem_transaction(
    puzzle: &Puzzle,
    solution: &Solution,
    receive_pub_key_hash: &Digest20,
    sats_per_byte: f64,
    op_return: &[&[u8]],
) -> Result<Vec<u8>> {
    let output = puzzle.output();
    let is_bounty = output.job.is_bounty();
    let is_v2 = output.job.fields().use_general_purpose_bits;
    let placeholder = estimate_size(is_bounty, is_v2, solution.extra_nonce_2.len(), true) as u64;

    let mut incomplete = Tx {
        version: 1,
        inputs: vec![TxInput::new(
            OutPoint { txid: output.txid, vout: output.vout },
            InputScript::Placeholder(placeholder),
        )],
        outputs: vec![
            TxOutput { value: 0, script: p2pkh_script(receive_pub_key_hash) },
            TxOutput { value: 0, script: op_return_script(op_return) },
        ],
        lock_time: 0,
    };

    let estimated_size = incomplete.estimate_size();
    let fee = (estimated_size as f64 * sats_per_byte).ceil() as u64;
    if fee >= output.value {
        log::warn!("redeem fee {fee} sats is not less than output value {} sats", output.value);
        return Err(Error::InsufficientFunds { fee, value: output.value });
    }
    incomplete.outputs[0].value = output.value - fee;

    let unlocking_script = puzzle.redeem(solution, &incomplete, 0)?;
    incomplete.inputs[0].script = InputScript::Concrete(unlocking_script);
    incomplete.serialize()
}

/// The redeeming side of a spend: the input's claimed previous output and
/// the unlocking-script fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Input {
    /// The txid the input claims to spend.
    pub spent_txid: Digest32,
    /// The output index the input claims to spend.
    pub spent_vout: u32,
    /// The parsed unlocking script.
    pub redeem: Redeem,
}

/// Couples a decoded `Output` with the `Input` that claims to spend it.
#[derive(Clone, Debug, PartialEq)]
pub struct Proof {
    /// The Boost output.
    pub output: Output,
    /// The input spending it.
    pub input: Input,
}

impl Proof {
    /// `valid() ⇔ output.txid == input.spentTxid ∧ output.vout ==
    /// input.spentVout ∧` the solution beats the job's target.
    pub fn verify(&self) -> Result<()> {
        if self.output.txid != self.input.spent_txid || self.output.vout != self.input.spent_vout {
            return Err(Error::BadScript {
                reason: "input does not reference this output's txid/vout".to_string(),
                offset: None,
            });
        }

        let miner_pub_key_hash = self
            .output
            .job
            .miner_pub_key_hash()
            .copied()
            .or(self.input.redeem.miner_pub_key_hash)
            .ok_or(Error::InvalidPuzzle)?;

        let puzzle = work::Puzzle::from_job(&self.output.job, &miner_pub_key_hash);
        work::verify(&puzzle, &self.input.redeem.solution)
    }
}
