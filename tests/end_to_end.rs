//! Cross-module scenarios: a job built and re-decoded from its own
//! locking script, a full sign-and-serialize redeem transaction, and the
//! invariants that only show up once every component is wired together.

use boostpow::facade::{create_redeem_transaction, Output};
use boostpow::field::{Bytes, Difficulty, Digest20, Digest32, Int32LE, UInt32BE, UInt32LE};
use boostpow::job::{Fields, Job};
use boostpow::tx::{self, InputScript, OutPoint, Tx, TxInput, TxOutput};
use boostpow::{Puzzle, Solution};
use secp256k1::SecretKey;

fn zero_fields(content: [u8; 32], tag_len: usize, gpr: bool) -> Fields {
    Fields {
        content: Digest32::from_array(content),
        diff: Difficulty::from_compact(0x1d00_ffff).unwrap(),
        category: Int32LE::new(0),
        tag: Bytes::new(vec![0u8; tag_len]),
        user_nonce: UInt32LE::new(0),
        additional_data: Bytes::new(vec![0u8; 32]),
        use_general_purpose_bits: gpr,
        attached: None,
    }
}

/// A bounty-form v1 job built from fields, emitted to a locking script and
/// decoded back, reproduces every field and matches the locking-script
/// shape: tag push at position 0, `OP_DROP` at 1, a 4-byte push (not 20)
/// at position 2 distinguishing bounty from contract.
#[test]
fn decodes_a_hand_built_v1_bounty_locking_script() {
    let job = Job::Bounty(zero_fields([0x35; 32], 20, false));
    let script = job.to_locking_script();

    assert_eq!(&script[0..10], b"\x08boostpow\x75");

    let parsed = Job::from_locking_script(&script).unwrap();
    assert_eq!(parsed, job);
    assert!(parsed.is_bounty());
    assert_eq!(parsed.fields().diff.to_compact(), 0x1d00_ffff);
    assert_eq!(parsed.script_version(), 1);
}

/// A contract-form job rejects a spender whose key does not hash to the
/// committed `minerPubKeyHash` (`InvalidPuzzle`), and accepts the one
/// that does.
#[test]
fn contract_puzzle_accepts_only_the_committed_key() {
    let secp = secp256k1::Secp256k1::signing_only();
    let right_key = SecretKey::from_slice(&[0x07; 32]).unwrap();
    let wrong_key = SecretKey::from_slice(&[0x08; 32]).unwrap();
    let right_hash =
        boostpow::hash::hash160(&secp256k1::PublicKey::from_secret_key(&secp, &right_key).serialize());

    let job = Job::Contract(zero_fields([0x11; 32], 0, false), right_hash);
    let output = |job: Job| Output { job, txid: Digest32::from_array([0x22; 32]), vout: 0, value: 50_000 };

    assert!(Puzzle::new(output(job.clone()), wrong_key).is_err());
    assert!(Puzzle::new(output(job), right_key).is_ok());
}

/// A v2 (ASICBoost) bounty job round-trips through its own locking script
/// and sets `use_general_purpose_bits` on the decoded copy.
#[test]
fn v2_job_round_trips_and_flags_general_purpose_bits() {
    let job = Job::Bounty(zero_fields([0x99; 32], 5, true));
    let script = job.to_locking_script();
    let parsed = Job::from_locking_script(&script).unwrap();
    assert!(parsed.fields().use_general_purpose_bits);
    assert_eq!(parsed.script_version(), 2);
    assert_eq!(parsed.to_locking_script(), script);
}

/// Building a full redeem transaction for a bounty output signs and
/// serializes successfully, spends a fee proportional to its size, and
/// leaves the receiving output with `value - fee` satoshis. A
/// close-to-maximal DER signature would pin fee/size to a tight band
/// around the requested rate; a freshly generated key may sign shorter,
/// so this only checks fee/size stays within a wide band of that rate.
#[test]
fn redeem_transaction_pays_a_fee_proportional_to_its_size() {
    let secret_key = SecretKey::from_slice(&[0x42; 32]).unwrap();
    // An easy target (as the facade tests use) rather than mainnet
    // difficulty-1: the solution below only beats a target this loose.
    let mut fields = zero_fields([0x11; 32], 0, false);
    fields.diff = Difficulty::from_compact(0x207f_ffff).unwrap();
    let output = Output {
        job: Job::Bounty(fields),
        txid: Digest32::from_array([0x33; 32]),
        vout: 1,
        value: 8_317,
    };
    let puzzle = Puzzle::new(output, secret_key).unwrap();
    let solution = Solution::new(
        UInt32LE::new(0x5e6d_c081),
        UInt32BE::new(0x0a00_000a),
        Bytes::new(vec![0xbf; 8]),
        UInt32LE::new(0),
        None,
    )
    .unwrap();
    let receive = Digest20::from_array([0x44; 20]);
    let sats_per_byte = 0.2;

    let input_value = puzzle.output().value;
    let raw = create_redeem_transaction(&puzzle, &solution, &receive, sats_per_byte, &[b"boostpow", b"proof"])
        .unwrap();

    // Walk the serialized transaction with the crate's own var-int reader
    // rather than hard-coding byte offsets.
    let mut i = 4usize; // version
    let input_count = tx::read_var_int(&raw, &mut i).unwrap();
    assert_eq!(input_count, 1);
    i += 32 + 4; // prev txid + vout
    let script_len = tx::read_var_int(&raw, &mut i).unwrap() as usize;
    i += script_len + 4; // scriptSig + sequence
    let output_count = tx::read_var_int(&raw, &mut i).unwrap();
    assert_eq!(output_count, 2);
    let paid_to_receiver = u64::from_le_bytes(raw[i..i + 8].try_into().unwrap());

    let actual_size = raw.len() as f64;
    let fee = (input_value - paid_to_receiver) as f64;

    let ratio = fee / actual_size;
    assert!(ratio > sats_per_byte * 0.5 && ratio < sats_per_byte * 3.0, "fee/size ratio {ratio} out of band");
}

/// The ASICBoost version mask is idempotent exactly when the
/// general-purpose bits agree with the category outside the mask:
/// `(cat & m) | (gpr & ~m) == cat` iff `gpr & ~m == cat & ~m`.
#[test]
fn mask_application_is_idempotent_iff_gpr_agrees_outside_the_mask() {
    let mask = boostpow::job::GPR_MASK;
    let cat: u32 = 0x2000_0000;

    let agreeing_gpr = cat & !mask;
    assert_eq!((cat & mask) | (agreeing_gpr & !mask), cat);

    let disagreeing_gpr = (cat & !mask) ^ 0x0000_2000;
    assert_ne!((cat & mask) | (disagreeing_gpr & !mask), cat);
}

/// A BIP-143+FORKID signature produced by `tx::sign` verifies under the
/// corresponding public key, and is rejected under an unrelated one.
#[test]
fn bip143_forkid_signature_round_trips() {
    let secp = secp256k1::Secp256k1::signing_only();
    let secret_key = SecretKey::from_slice(&[0x09; 32]).unwrap();
    let other_key = SecretKey::from_slice(&[0x0a; 32]).unwrap();
    let pubkey = secp256k1::PublicKey::from_secret_key(&secp, &secret_key);
    let other_pubkey = secp256k1::PublicKey::from_secret_key(&secp, &other_key);

    let script_code = vec![0x76, 0xa9, 0x14];
    let tx = Tx {
        version: 1,
        inputs: vec![TxInput::new(
            OutPoint { txid: Digest32::from_array([0x01; 32]), vout: 0 },
            InputScript::Placeholder(107),
        )],
        outputs: vec![TxOutput { value: 9_000, script: vec![0x76, 0xa9] }],
        lock_time: 0,
    };

    let signature = tx::sign(&tx, 0, &script_code, 10_000, &secret_key).unwrap();
    assert!(tx::verify(&tx, 0, &script_code, 10_000, &signature, &pubkey).is_ok());
    assert!(tx::verify(&tx, 0, &script_code, 10_000, &signature, &other_pubkey).is_err());
}
