//! Typed, fixed-width byte fields. Each field wraps an exact-size
//! buffer (or, for [`Bytes`], a variable-size one) and carries its
//! endianness in its type rather than in a runtime flag, so a
//! `UInt32LE` can never be silently handed to code expecting a
//! `UInt32BE`.

mod bytes;
mod difficulty;
mod digest;
mod int;
mod u256;

pub use self::bytes::{create_buffer_and_pad, Bytes};
pub use self::difficulty::Difficulty;
pub use self::digest::{Digest20, Digest32};
pub use self::int::{Int32LE, UInt16LE, UInt32BE, UInt32LE};
pub use self::u256::U256;
