//! The script primitive: a sequence of chunks, each either a bare
//! opcode or a push of some payload, with Bitcoin's minimal-push encoding
//! rules enforced on synthesis (never on parse — non-minimal pushes are
//! valid input, just not something we ever emit).

pub mod opcodes;

use crate::error::{Error, Result};

/// One element of a parsed script: either a bare opcode, or a push of
/// `buf` via the opcode that introduced it (which, for a parsed-and-not-
/// rebuilt script, may or may not be the minimal one).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Chunk {
    /// A non-data-bearing opcode (e.g. `OP_DROP`, `OP_CHECKSIG`).
    Op(u8),
    /// A push, carrying the opcode that encoded it and the pushed bytes.
    Push { opcode: u8, buf: Vec<u8> },
}

impl Chunk {
    /// The pushed payload, if this chunk is a push (including the
    /// small-int/`OP_0`/`OP_1NEGATE` encodings, which push a payload too).
    #[must_use]
    pub fn as_push(&self) -> Option<&[u8]> {
        match self {
            Chunk::Push { buf, .. } => Some(buf),
            Chunk::Op(_) => None,
        }
    }

    /// Builds the chunk for `buf` using Bitcoin's minimal push encoding
    /// rule.
    #[must_use]
    pub fn minimal_push(buf: &[u8]) -> Chunk {
        use opcodes::*;
        if buf.is_empty() {
            return Chunk::Push { opcode: OP_0, buf: Vec::new() };
        }
        if buf.len() == 1 {
            if let Some(op) = op_n(buf[0]) {
                return Chunk::Push { opcode: op, buf: buf.to_vec() };
            }
            if buf[0] == 0x81 {
                return Chunk::Push { opcode: OP_1NEGATE, buf: buf.to_vec() };
            }
        }
        let len = buf.len();
        let opcode = if len <= 75 {
            len as u8
        } else if len <= 0xff {
            OP_PUSHDATA1
        } else if len <= 0xffff {
            OP_PUSHDATA2
        } else {
            OP_PUSHDATA4
        };
        Chunk::Push { opcode, buf: buf.to_vec() }
    }
}

/// An ordered sequence of script chunks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Script(Vec<Chunk>);

impl Script {
    /// An empty script.
    #[must_use]
    pub fn new() -> Self {
        Script(Vec::new())
    }

    /// Parses a raw script. Non-minimal pushes are accepted — minimality
    /// is a synthesis-time rule only.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        use opcodes::*;

        let mut chunks = Vec::new();
        let mut i = 0usize;
        while i < bytes.len() {
            let op = bytes[i];
            i += 1;
            match op {
                OP_0 => chunks.push(Chunk::Push { opcode: op, buf: Vec::new() }),
                OP_1NEGATE => chunks.push(Chunk::Push { opcode: op, buf: vec![0x81] }),
                1..=75 => {
                    let len = op as usize;
                    let buf = read_exact(bytes, &mut i, len, i - 1)?;
                    chunks.push(Chunk::Push { opcode: op, buf });
                }
                OP_PUSHDATA1 => {
                    let len = read_exact(bytes, &mut i, 1, i - 1)?[0] as usize;
                    let buf = read_exact(bytes, &mut i, len, i - 1)?;
                    chunks.push(Chunk::Push { opcode: op, buf });
                }
                OP_PUSHDATA2 => {
                    let raw = read_exact(bytes, &mut i, 2, i - 1)?;
                    let len = u16::from_le_bytes([raw[0], raw[1]]) as usize;
                    let buf = read_exact(bytes, &mut i, len, i - 1)?;
                    chunks.push(Chunk::Push { opcode: op, buf });
                }
                OP_PUSHDATA4 => {
                    let raw = read_exact(bytes, &mut i, 4, i - 1)?;
                    let len = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize;
                    let buf = read_exact(bytes, &mut i, len, i - 1)?;
                    chunks.push(Chunk::Push { opcode: op, buf });
                }
                _ if (OP_1..=OP_16).contains(&op) => {
                    chunks.push(Chunk::Push { opcode: op, buf: vec![op - OP_1 + 1] });
                }
                _ => chunks.push(Chunk::Op(op)),
            }
        }
        Ok(Script(chunks))
    }

    /// Re-serializes, preserving each chunk's own opcode (so parsing then
    /// re-emitting a non-minimal script round-trips byte for byte).
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        bytes_of(&self.0)
    }

    /// Appends a minimally-encoded push of `buf`.
    pub fn push(&mut self, buf: &[u8]) -> &mut Self {
        self.0.push(Chunk::minimal_push(buf));
        self
    }

    /// Appends a bare opcode.
    pub fn push_opcode(&mut self, op: u8) -> &mut Self {
        self.0.push(Chunk::Op(op));
        self
    }

    /// Appends a pre-built chunk (used to splice in the literal `BODY_V1`/
    /// `BODY_V2` byte strings).
    pub fn extend_bytes(&mut self, raw: &[u8]) -> Result<&mut Self> {
        for chunk in Script::from_bytes(raw)?.0 {
            self.0.push(chunk);
        }
        Ok(self)
    }

    /// The parsed chunks.
    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.0
    }

    /// Number of chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the script has no chunks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Serializes a slice of chunks the same way [`Script::to_bytes`] does.
/// Exposed so the job parser can re-encode a sub-slice of a parsed
/// script's chunks (the tail after its fixed-position fields) and compare
/// it against the literal `BODY_V1`/`BODY_V2` byte constants.
#[must_use]
pub fn bytes_of(chunks: &[Chunk]) -> Vec<u8> {
    let mut out = Vec::new();
    for chunk in chunks {
        match chunk {
            Chunk::Op(op) => out.push(*op),
            Chunk::Push { opcode, buf } => {
                out.push(*opcode);
                match *opcode {
                    opcodes::OP_PUSHDATA1 => out.push(buf.len() as u8),
                    opcodes::OP_PUSHDATA2 => out.extend((buf.len() as u16).to_le_bytes()),
                    opcodes::OP_PUSHDATA4 => out.extend((buf.len() as u32).to_le_bytes()),
                    _ => {}
                }
                if !matches!(*opcode, opcodes::OP_0 | opcodes::OP_1NEGATE | opcodes::OP_1..=opcodes::OP_16)
                {
                    out.extend_from_slice(buf);
                }
            }
        }
    }
    out
}

fn read_exact(bytes: &[u8], i: &mut usize, len: usize, offset: usize) -> Result<Vec<u8>> {
    let end = *i + len;
    if end > bytes.len() {
        return Err(Error::BadScript {
            reason: format!("push of {len} bytes runs past end of script"),
            offset: Some(offset),
        });
    }
    let buf = bytes[*i..end].to_vec();
    *i = end;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_push_rules() {
        assert_eq!(Chunk::minimal_push(&[]), Chunk::Push { opcode: opcodes::OP_0, buf: vec![] });
        assert_eq!(
            Chunk::minimal_push(&[5]),
            Chunk::Push { opcode: opcodes::OP_1 + 4, buf: vec![5] }
        );
        assert_eq!(
            Chunk::minimal_push(&[0x81]),
            Chunk::Push { opcode: opcodes::OP_1NEGATE, buf: vec![0x81] }
        );
        assert_eq!(Chunk::minimal_push(&[0, 1, 2]), Chunk::Push { opcode: 3, buf: vec![0, 1, 2] });
    }

    #[test]
    fn round_trips_a_hand_built_script() {
        let mut s = Script::new();
        s.push(b"boostpow").push_opcode(opcodes::OP_DROP).push(&[0u8; 20]);
        let bytes = s.to_bytes();
        let parsed = Script::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, s);
        assert_eq!(parsed.to_bytes(), bytes);
    }

    #[test]
    fn pushdata1_round_trips() {
        let payload = vec![0x42u8; 200];
        let mut s = Script::new();
        s.push(&payload);
        let bytes = s.to_bytes();
        assert_eq!(bytes[0], opcodes::OP_PUSHDATA1);
        let parsed = Script::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.chunks()[0].as_push(), Some(payload.as_slice()));
    }

    #[test]
    fn truncated_push_reports_offset() {
        let bytes = [0x04u8, 1, 2];
        match Script::from_bytes(&bytes) {
            Err(Error::BadScript { offset: Some(0), .. }) => {}
            other => panic!("expected BadScript at offset 0, got {other:?}"),
        }
    }
}
