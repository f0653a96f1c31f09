//! The subset of Bitcoin Script opcodes this crate needs to know by name:
//! the push-encoding family, and the literal opcodes that appear in the
//! Boost body templates.

#![allow(missing_docs)]

pub const OP_0: u8 = 0x00;
pub const OP_FALSE: u8 = OP_0;
pub const OP_RETURN: u8 = 0x6a;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1NEGATE: u8 = 0x4f;
pub const OP_1: u8 = 0x51;
pub const OP_16: u8 = 0x60;

pub const OP_VERIFY: u8 = 0x69;
pub const OP_TOALTSTACK: u8 = 0x6b;
pub const OP_FROMALTSTACK: u8 = 0x6c;
pub const OP_2DROP: u8 = 0x6d;
pub const OP_DROP: u8 = 0x75;
pub const OP_DUP: u8 = 0x76;
pub const OP_PICK: u8 = 0x79;
pub const OP_ROLL: u8 = 0x7a;
pub const OP_SWAP: u8 = 0x7c;
pub const OP_CAT: u8 = 0x7e;
pub const OP_SPLIT: u8 = 0x7f;
pub const OP_NUM2BIN: u8 = 0x80;
pub const OP_BIN2NUM: u8 = 0x81;
pub const OP_SIZE: u8 = 0x82;
pub const OP_INVERT: u8 = 0x83;
pub const OP_AND: u8 = 0x84;
pub const OP_OR: u8 = 0x85;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_1ADD: u8 = 0x8b;
pub const OP_1SUB: u8 = 0x8c;
pub const OP_SUB: u8 = 0x94;

pub const OP_GREATERTHAN: u8 = 0xa3;
pub const OP_LESSTHAN: u8 = 0xa1;
pub const OP_WITHIN: u8 = 0xa5;

pub const OP_SHA256: u8 = 0xa8;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_HASH256: u8 = 0xaa;
pub const OP_CHECKSIG: u8 = 0xac;

/// `OP_1` through `OP_16` encode the small integers `1..=16` as a single
/// opcode byte rather than a push.
#[must_use]
pub fn op_n(n: u8) -> Option<u8> {
    if (1..=16).contains(&n) {
        Some(OP_1 + (n - 1))
    } else {
        None
    }
}

/// The inverse of [`op_n`]: decodes `OP_1..=OP_16` back to its small
/// integer, if the opcode is in that range.
#[must_use]
pub fn n_from_op(op: u8) -> Option<u8> {
    if (OP_1..=OP_16).contains(&op) {
        Some(op - OP_1 + 1)
    } else {
        None
    }
}
