//! The transaction codec and sighash: var-int, incomplete/complete
//! transaction serialization, BIP-143 + FORKID sighash preimage
//! construction, and ECDSA sign/verify over it.

use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

use crate::error::{Error, Result};
use crate::field::Digest32;
use crate::hash;

/// `SIGHASH_ALL`.
pub const SIGHASH_ALL: u8 = 0x01;
/// The BSV/BCH fork-id flag OR'd into every sighash type.
pub const SIGHASH_FORKID: u8 = 0x40;
/// The sighash type this crate always signs with: `SIGHASH_ALL | FORKID`.
pub const SIGHASH_ALL_FORKID: u8 = SIGHASH_ALL | SIGHASH_FORKID;

/// Encodes a Bitcoin var-int.
#[must_use]
pub fn write_var_int(n: u64) -> Vec<u8> {
    if n < 0xfd {
        vec![n as u8]
    } else if n <= 0xffff {
        let mut v = vec![0xfd];
        v.extend_from_slice(&(n as u16).to_le_bytes());
        v
    } else if n <= 0xffff_ffff {
        let mut v = vec![0xfe];
        v.extend_from_slice(&(n as u32).to_le_bytes());
        v
    } else {
        let mut v = vec![0xff];
        v.extend_from_slice(&n.to_le_bytes());
        v
    }
}

/// The encoded width of [`write_var_int`]'s output for `n`, without
/// allocating.
#[must_use]
pub fn var_int_size(n: u64) -> u64 {
    if n < 0xfd {
        1
    } else if n <= 0xffff {
        3
    } else if n <= 0xffff_ffff {
        5
    } else {
        9
    }
}

/// Decodes a Bitcoin var-int starting at `*i`, advancing `*i` past it.
pub fn read_var_int(bytes: &[u8], i: &mut usize) -> Result<u64> {
    let tag = *bytes.get(*i).ok_or(Error::BadLength { expected: 1, actual: 0 })?;
    *i += 1;
    let value = match tag {
        0xfd => u64::from(read_u16(bytes, i)?),
        0xfe => u64::from(read_u32(bytes, i)?),
        0xff => read_u64(bytes, i)?,
        n => u64::from(n),
    };
    Ok(value)
}

fn read_u16(bytes: &[u8], i: &mut usize) -> Result<u16> {
    let arr: [u8; 2] = bytes
        .get(*i..*i + 2)
        .and_then(|s| s.try_into().ok())
        .ok_or(Error::BadLength { expected: 2, actual: bytes.len().saturating_sub(*i) })?;
    *i += 2;
    Ok(u16::from_le_bytes(arr))
}

fn read_u32(bytes: &[u8], i: &mut usize) -> Result<u32> {
    let arr: [u8; 4] = bytes
        .get(*i..*i + 4)
        .and_then(|s| s.try_into().ok())
        .ok_or(Error::BadLength { expected: 4, actual: bytes.len().saturating_sub(*i) })?;
    *i += 4;
    Ok(u32::from_le_bytes(arr))
}

fn read_u64(bytes: &[u8], i: &mut usize) -> Result<u64> {
    let arr: [u8; 8] = bytes
        .get(*i..*i + 8)
        .and_then(|s| s.try_into().ok())
        .ok_or(Error::BadLength { expected: 8, actual: bytes.len().saturating_sub(*i) })?;
    *i += 8;
    Ok(u64::from_le_bytes(arr))
}

/// An input's previous output: the transaction and index being spent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutPoint {
    /// The previous transaction's id.
    pub txid: Digest32,
    /// The output index within that transaction.
    pub vout: u32,
}

/// An input's scriptSig: either a real script, or (before signing) a
/// placeholder byte count used to size the transaction for fee
/// calculation before signing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputScript {
    /// A not-yet-built script of this many bytes.
    Placeholder(u64),
    /// The actual script bytes.
    Concrete(Vec<u8>),
}

impl InputScript {
    /// The byte length this script contributes to a size estimate.
    #[must_use]
    pub fn len(&self) -> u64 {
        match self {
            InputScript::Placeholder(n) => *n,
            InputScript::Concrete(bytes) => bytes.len() as u64,
        }
    }

    /// Whether the placeholder/script is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A transaction input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxInput {
    /// The output being spent.
    pub prev_out: OutPoint,
    /// The scriptSig, concrete or a size placeholder.
    pub script: InputScript,
    /// The sequence number (default `0xffff_ffff`).
    pub sequence: u32,
}

impl TxInput {
    /// An input with the default sequence number and no script yet.
    #[must_use]
    pub fn new(prev_out: OutPoint, script: InputScript) -> Self {
        TxInput { prev_out, script, sequence: 0xffff_ffff }
    }
}

/// A transaction output: always concrete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOutput {
    /// The output's value, in satoshis.
    pub value: u64,
    /// The locking script.
    pub script: Vec<u8>,
}

/// A Bitcoin transaction, possibly still carrying input-script size
/// placeholders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tx {
    /// The transaction version.
    pub version: i32,
    /// The inputs.
    pub inputs: Vec<TxInput>,
    /// The outputs.
    pub outputs: Vec<TxOutput>,
    /// The lock time.
    pub lock_time: u32,
}

impl Tx {
    /// The size estimate: `8 + varInt(inputs) + varInt(outputs) +
    /// Σ(40 + varInt(sᵢ) + sᵢ) + Σ(8 + varInt(sⱼ) + sⱼ)`. Monotonic in any
    /// input's script size, since every term it depends on is added,
    /// never subtracted.
    #[must_use]
    pub fn estimate_size(&self) -> u64 {
        let mut total = 8u64;
        total += var_int_size(self.inputs.len() as u64);
        total += var_int_size(self.outputs.len() as u64);
        for input in &self.inputs {
            let s = input.script.len();
            total += 40 + var_int_size(s) + s;
        }
        for output in &self.outputs {
            let s = output.script.len() as u64;
            total += 8 + var_int_size(s) + s;
        }
        total
    }

    /// Serializes the transaction. Fails if any input still carries a
    /// size placeholder instead of a concrete script.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend(write_var_int(self.inputs.len() as u64));
        for input in &self.inputs {
            let script = match &input.script {
                InputScript::Concrete(bytes) => bytes,
                InputScript::Placeholder(_) => {
                    return Err(Error::BadScript {
                        reason: "cannot serialize a transaction with an unresolved input script size"
                            .to_string(),
                        offset: None,
                    })
                }
            };
            out.extend_from_slice(&input.prev_out.txid.to_bytes());
            out.extend_from_slice(&input.prev_out.vout.to_le_bytes());
            out.extend(write_var_int(script.len() as u64));
            out.extend_from_slice(script);
            out.extend_from_slice(&input.sequence.to_le_bytes());
        }
        out.extend(write_var_int(self.outputs.len() as u64));
        for output in &self.outputs {
            out.extend_from_slice(&output.value.to_le_bytes());
            out.extend(write_var_int(output.script.len() as u64));
            out.extend_from_slice(&output.script);
        }
        out.extend_from_slice(&self.lock_time.to_le_bytes());
        Ok(out)
    }
}

/// Builds the BIP-143 + FORKID sighash preimage for spending `input_index`
/// with `script_code` (the output's locking script) and `amount` (the
/// output's value). `sighash_type` should not include the FORKID bit —
/// this function ORs it in.
#[must_use]
pub fn sighash_preimage(tx: &Tx, input_index: usize, script_code: &[u8], amount: u64, sighash_type: u8) -> Vec<u8> {
    let mut prevouts = Vec::new();
    let mut sequences = Vec::new();
    for input in &tx.inputs {
        prevouts.extend_from_slice(&input.prev_out.txid.to_bytes());
        prevouts.extend_from_slice(&input.prev_out.vout.to_le_bytes());
        sequences.extend_from_slice(&input.sequence.to_le_bytes());
    }
    let hash_prevouts = hash::sha256d(&prevouts);
    let hash_sequence = hash::sha256d(&sequences);

    let mut outputs_buf = Vec::new();
    for output in &tx.outputs {
        outputs_buf.extend_from_slice(&output.value.to_le_bytes());
        outputs_buf.extend(write_var_int(output.script.len() as u64));
        outputs_buf.extend_from_slice(&output.script);
    }
    let hash_outputs = hash::sha256d(&outputs_buf);

    let input = &tx.inputs[input_index];
    let mut preimage = Vec::new();
    preimage.extend_from_slice(&tx.version.to_le_bytes());
    preimage.extend_from_slice(&hash_prevouts.to_bytes());
    preimage.extend_from_slice(&hash_sequence.to_bytes());
    preimage.extend_from_slice(&input.prev_out.txid.to_bytes());
    preimage.extend_from_slice(&input.prev_out.vout.to_le_bytes());
    preimage.extend(write_var_int(script_code.len() as u64));
    preimage.extend_from_slice(script_code);
    preimage.extend_from_slice(&amount.to_le_bytes());
    preimage.extend_from_slice(&input.sequence.to_le_bytes());
    preimage.extend_from_slice(&hash_outputs.to_bytes());
    preimage.extend_from_slice(&tx.lock_time.to_le_bytes());
    preimage.extend_from_slice(&u32::from(sighash_type | SIGHASH_FORKID).to_le_bytes());
    preimage
}

/// The digest actually signed: `sha256d` of the BIP-143+FORKID preimage.
#[must_use]
pub fn sighash(tx: &Tx, input_index: usize, script_code: &[u8], amount: u64, sighash_type: u8) -> Digest32 {
    hash::sha256d(&sighash_preimage(tx, input_index, script_code, amount, sighash_type))
}

/// Signs `input_index` of `tx` with `secret_key`, deterministically
/// (RFC-6979) and with a low-S DER signature, returning the wire
/// signature (DER bytes plus the trailing sighash-type byte).
pub fn sign(tx: &Tx, input_index: usize, script_code: &[u8], amount: u64, secret_key: &SecretKey) -> Result<Vec<u8>> {
    let digest = sighash(tx, input_index, script_code, amount, SIGHASH_ALL);
    let message = Message::from_slice(&digest.to_bytes())?;
    let secp = Secp256k1::signing_only();
    let signature = secp.sign_ecdsa(&message, secret_key);
    let mut wire = signature.serialize_der().to_vec();
    wire.push(SIGHASH_ALL_FORKID);
    Ok(wire)
}

/// Verifies a wire signature (DER + trailing sighash-type byte) against
/// `pubkey` over `tx`'s sighash for `input_index`.
pub fn verify(
    tx: &Tx,
    input_index: usize,
    script_code: &[u8],
    amount: u64,
    wire_signature: &[u8],
    pubkey: &PublicKey,
) -> Result<()> {
    let (sighash_type_byte, der_bytes) = wire_signature
        .split_last()
        .ok_or_else(|| Error::BadScript { reason: "empty signature".to_string(), offset: None })?;
    let digest = sighash(tx, input_index, script_code, amount, sighash_type_byte & SIGHASH_ALL);
    let message = Message::from_slice(&digest.to_bytes())?;
    let signature = Signature::from_der(der_bytes).map_err(Error::SignatureFailure)?;
    let secp = Secp256k1::verification_only();
    secp.verify_ecdsa(&message, &signature, pubkey).map_err(Error::SignatureFailure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_int_round_trips() {
        for n in [0u64, 0xfc, 0xfd, 0xffff, 0x1_0000, 0xffff_ffff, 0x1_0000_0000] {
            let bytes = write_var_int(n);
            let mut i = 0;
            assert_eq!(read_var_int(&bytes, &mut i).unwrap(), n);
            assert_eq!(i, bytes.len());
        }
    }

    #[test]
    fn size_estimate_is_monotonic_in_input_script_size() {
        let mut tx = Tx {
            version: 1,
            inputs: vec![TxInput::new(
                OutPoint { txid: Digest32::from_array([0u8; 32]), vout: 0 },
                InputScript::Placeholder(100),
            )],
            outputs: vec![TxOutput { value: 1000, script: vec![0u8; 25] }],
            lock_time: 0,
        };
        let small = tx.estimate_size();
        tx.inputs[0].script = InputScript::Placeholder(200);
        let big = tx.estimate_size();
        assert!(big > small);
    }

    #[test]
    fn serialize_rejects_placeholder_scripts() {
        let tx = Tx {
            version: 1,
            inputs: vec![TxInput::new(
                OutPoint { txid: Digest32::from_array([0u8; 32]), vout: 0 },
                InputScript::Placeholder(10),
            )],
            outputs: vec![],
            lock_time: 0,
        };
        assert!(tx.serialize().is_err());
    }
}
