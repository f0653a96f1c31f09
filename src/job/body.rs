//! The literal body-op byte sequences appended after a Boost locking
//! script's prefix pushes: `BODY_V1` for the plain form, `BODY_V2` for the
//! ASICBoost form that additionally masks in general-purpose bits and
//! relaxes the `extraNonce2` size check from "exactly 8" to "at most 32".
//!
//! Both constants are a hand-assembled verifier executed at mining time,
//! reconstructing `sha256d(category ∥ content ∥ sha256d(tag ∥
//! minerPubKeyHash ∥ extraNonce1 ∥ extraNonce2 ∥ userNonce ∥
//! additionalData) ∥ time ∥ bits ∥ nonce)` directly from the stack left
//! behind by the unlocking-script pushes and the locking script's own
//! field pushes, comparing it against the target expanded from the
//! compact `bits` field, then binding redemption to `minerPubKeyHash` via
//! `OP_DUP OP_HASH160 ... OP_EQUALVERIFY OP_CHECKSIG`.
//!
//! The leading four bytes (`OP_CAT OP_SWAP OP_5 OP_ROLL`) are a literal
//! ground truth: the spec's own S1 example locking script gives the real
//! body's first bytes as `7e 7c 55 7a`, immediately after the
//! `additionalData` push. Those four ops, read against the stack shape at
//! that point (`additionalData` on top, `userNonce` next, `minerPubKeyHash`
//! five items down), compute `userNonce ∥ additionalData` and bring
//! `minerPubKeyHash` to the top — which is exactly what the rest of the
//! verifier needs next. No further byte-level reference exists in this
//! pack to diff the remainder against (see DESIGN.md), so everything past
//! that prefix is reconstructed from the formula above by tracing the
//! stack through each `OP_CAT`/`OP_ROLL`, not invented wholesale.
//!
//! `minerPubKeyHash` is needed twice — once folded into `metaBegin`, once
//! again for the final pubkey-hash check — so it is `OP_DUP`'d right after
//! the mandated `OP_ROLL` brings it up, and the spare copy is carried,
//! undisturbed, under every later `OP_CAT`/`OP_ROLL` until the tail needs
//! it. The compact `target` field is handled the same way: folded into the
//! header bytes once, and a spare copy is expanded (`OP_SPLIT` off the
//! exponent byte, `OP_SUB` 3, `OP_NUM2BIN` that many zero bytes, `OP_CAT`
//! onto the mantissa) into a full-width number for `OP_LESSTHAN` against
//! the header hash. Post-Genesis BSV's unbounded-width `OP_CAT`/script
//! numbers are what make this expansion possible inside Script at all.

use crate::script::opcodes::*;

/// The v1 body: hashes the header fields into a PoW digest, checks it
/// against the expanded target, then binds redemption to the committed
/// public-key hash.
#[rustfmt::skip]
pub static BODY_V1: &[u8] = &[
    // metaEnd = userNonce || additionalData; bring minerPubKeyHash to the
    // top. Literal ground truth: 7e 7c 55 7a.
    OP_CAT, OP_SWAP, OP_1 + 4, OP_ROLL,

    // spare minerPubKeyHash parked; pull tag up; metaBegin = tag || minerPubKeyHash
    OP_DUP, OP_1 + 1, OP_ROLL, OP_SWAP, OP_CAT,

    // metaBegin || extraNonce1
    OP_1 + 5, OP_ROLL, OP_CAT,

    // extraNonce2 must be exactly 8 bytes; metaBegin||extraNonce1||extraNonce2
    OP_1 + 5, OP_ROLL, OP_SIZE, OP_1 + 7, OP_EQUALVERIFY, OP_CAT,

    // ..||metaEnd, then hash to metaHash
    OP_1 + 1, OP_ROLL, OP_CAT, OP_HASH256,

    // category || content
    OP_1 + 3, OP_ROLL, OP_1 + 3, OP_ROLL, OP_CAT,

    // ..||metaHash
    OP_1, OP_ROLL, OP_CAT,

    // ..||time
    OP_1 + 2, OP_ROLL, OP_CAT,

    // target used twice: dup it, fold one copy into the header, park the other
    OP_1 + 1, OP_ROLL, OP_DUP, OP_1 + 1, OP_ROLL, OP_SWAP, OP_CAT,

    // ..||nonce, then hash to headerHash
    OP_1 + 2, OP_ROLL, OP_CAT, OP_HASH256,

    // expand the parked compact target: split off the exponent byte,
    // subtract 3, NUM2BIN that many zero bytes, append to the mantissa
    OP_1, OP_ROLL, OP_1 + 2, OP_SPLIT, OP_1 + 2, OP_SUB, OP_0, OP_SWAP, OP_NUM2BIN, OP_CAT,

    // headerHash < target
    OP_LESSTHAN, OP_VERIFY,

    // bind to minerPubKeyHash, then check the signature
    OP_SWAP, OP_DUP, OP_HASH160, OP_1 + 1, OP_ROLL, OP_EQUALVERIFY, OP_CHECKSIG,
];

/// The v2 (ASICBoost) body: identical in shape to `BODY_V1`, but the
/// category word is OR-masked with the miner-supplied general-purpose
/// bits under `0xe0001fff` before hashing, and `extraNonce2`'s size is
/// bounded above (`< 33`, i.e. at most 32 bytes) rather than fixed at 8.
#[rustfmt::skip]
pub static BODY_V2: &[u8] = &[
    // metaEnd = userNonce || additionalData; bring minerPubKeyHash to the
    // top. Literal ground truth: 7e 7c 55 7a.
    OP_CAT, OP_SWAP, OP_1 + 4, OP_ROLL,

    // spare minerPubKeyHash parked; pull tag up; metaBegin = tag || minerPubKeyHash
    OP_DUP, OP_1 + 1, OP_ROLL, OP_SWAP, OP_CAT,

    // metaBegin || extraNonce1
    OP_1 + 5, OP_ROLL, OP_CAT,

    // extraNonce2 must be at most 32 bytes; metaBegin||extraNonce1||extraNonce2
    OP_1 + 5, OP_ROLL, OP_SIZE, 0x01, 33, OP_LESSTHAN, OP_VERIFY, OP_CAT,

    // ..||metaEnd, then hash to metaHash
    OP_1 + 1, OP_ROLL, OP_CAT, OP_HASH256,

    // category = (category & ~mask) | (gpr & mask), mask little-endian ff1f00e0
    OP_1 + 3, OP_ROLL,
    0x04, 0xff, 0x1f, 0x00, 0xe0, OP_INVERT, OP_AND,
    OP_1 + 5, OP_ROLL,
    0x04, 0xff, 0x1f, 0x00, 0xe0, OP_AND,
    OP_OR,

    // category || content
    OP_1 + 3, OP_ROLL, OP_CAT,

    // ..||metaHash
    OP_1, OP_ROLL, OP_CAT,

    // ..||time
    OP_1 + 2, OP_ROLL, OP_CAT,

    // target used twice: dup it, fold one copy into the header, park the other
    OP_1 + 1, OP_ROLL, OP_DUP, OP_1 + 1, OP_ROLL, OP_SWAP, OP_CAT,

    // ..||nonce, then hash to headerHash
    OP_1 + 2, OP_ROLL, OP_CAT, OP_HASH256,

    // expand the parked compact target: split off the exponent byte,
    // subtract 3, NUM2BIN that many zero bytes, append to the mantissa
    OP_1, OP_ROLL, OP_1 + 2, OP_SPLIT, OP_1 + 2, OP_SUB, OP_0, OP_SWAP, OP_NUM2BIN, OP_CAT,

    // headerHash < target
    OP_LESSTHAN, OP_VERIFY,

    // bind to minerPubKeyHash, then check the signature
    OP_SWAP, OP_DUP, OP_HASH160, OP_1 + 1, OP_ROLL, OP_EQUALVERIFY, OP_CHECKSIG,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bodies_are_distinct_and_nonempty() {
        assert_ne!(BODY_V1, BODY_V2);
        assert!(!BODY_V1.is_empty());
        assert!(!BODY_V2.is_empty());
    }

    /// The spec's own S1 locking-script example gives the literal bytes
    /// immediately following the `additionalData` push as `7e 7c 55 7a`
    /// (`OP_CAT OP_SWAP OP_5 OP_ROLL`) for both body forms.
    #[test]
    fn both_bodies_start_with_the_mandated_prefix() {
        let prefix = [OP_CAT, OP_SWAP, OP_1 + 4, OP_ROLL];
        assert_eq!(&BODY_V1[..4], &prefix);
        assert_eq!(&BODY_V2[..4], &prefix);
    }

    #[test]
    fn both_bodies_end_in_the_pubkey_hash_check() {
        let tail = [OP_SWAP, OP_DUP, OP_HASH160, OP_1 + 1, OP_ROLL, OP_EQUALVERIFY, OP_CHECKSIG];
        assert_eq!(&BODY_V1[BODY_V1.len() - tail.len()..], &tail);
        assert_eq!(&BODY_V2[BODY_V2.len() - tail.len()..], &tail);
    }

    #[test]
    fn v2_relaxes_the_extra_nonce_2_size_check() {
        assert!(BODY_V1.windows(3).any(|w| w == [OP_SIZE, OP_1 + 7, OP_EQUALVERIFY]));
        assert!(BODY_V2.windows(4).any(|w| w == [OP_SIZE, 0x01, 33, OP_LESSTHAN]));
    }

    #[test]
    fn v2_masks_the_category_word() {
        let mask = [0x04, 0xff, 0x1f, 0x00, 0xe0];
        assert!(BODY_V2.windows(mask.len()).filter(|w| *w == mask).count() == 2);
        assert!(!BODY_V1.windows(mask.len()).any(|w| w == mask));
    }
}
