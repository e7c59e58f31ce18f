//! Fixed-format numeric and text field codecs for IBM-style host records.
//!
//! Numeric fields come in three wire forms, all described by an
//! `(integer digits, fractional digits)` pair:
//!
//! - **Zoned decimal** ([`ZonedField`]): one byte per digit; the low nibble
//!   holds the digit, the high nibble is `0xF` except on the rightmost byte,
//!   where it carries the sign (`0xC`/`0xF` positive, `0xD` negative).
//! - **Packed decimal** ([`PackedField`]): two digits per byte (BCD); the
//!   rightmost byte holds the last digit in its high nibble and the sign in
//!   its low nibble. The digit count is forced odd so the byte count is
//!   exact.
//! - **Unsigned packed** ([`UnsignedPackedField`]): nibble packing without a
//!   sign nibble; the digit count is forced even.
//!
//! Text fields ([`TextField`]) are fixed byte spans in a single-byte
//! (Latin-1) or double-byte (UTF-16BE) charset, space-padded on write and
//! trimmed on read.
//!
//! Decoding is strict: any nibble outside its expected set fails with a
//! malformed-data error carrying the field's byte offset, the format name
//! and a hex dump of the field span, and the buffer cursor is rewound to the
//! field start. Malformed input is never coerced to a default value.

mod field;
pub mod packed;
pub mod text;
pub mod zoned;

pub use packed::{PackedField, UnsignedPackedField};
pub use text::{Charset, TextField};
pub use zoned::ZonedField;

/// Largest total digit count a numeric field may be configured with.
///
/// The packed parity adjustments run after this check, so an unsigned packed
/// field configured at 31 digits stores 32 on the wire (see
/// [`UnsignedPackedField::new`]).
pub const MAX_DIGITS: u32 = 31;
