//! Compact self-describing tag-byte serialization.
//!
//! Every value is written as a single leading tag byte, optionally followed
//! by content bytes. The tag's high nibble selects the type family, the low
//! nibble the variant:
//!
//! | high nibble | family      | high nibble | family      |
//! |-------------|-------------|-------------|-------------|
//! | `0x0`       | boolean     | `0x8`       | string      |
//! | `0x1`       | byte        | `0x9`       | date        |
//! | `0x2`       | short       | `0xA`       | big-integer |
//! | `0x3`       | char        | `0xB`       | big-decimal |
//! | `0x4`       | int         | `0xC`       | byte-array  |
//! | `0x5`       | long        | `0xD`       | enum        |
//! | `0x6`       | float       | `0xE`       | object      |
//! | `0x7`       | double      |             |             |
//!
//! Variant `0x0` is null, `0x1` is the literal zero of the family (false,
//! numeric zero, empty, ordinal 0, object-present for the object family) and
//! `0x2 + k` means `k + 1` content bytes follow, most significant byte
//! first. Integer families sign-extend their content bytes back to full
//! width (chars and enum ordinals zero-extend); float families keep the
//! leading bytes of the IEEE bit pattern and the reader zero-pads the
//! suppressed trailing bytes. The writer always picks the smallest variant
//! that reconstructs the exact original bit pattern.
//!
//! Strings are a compacted char count followed by a two-stream payload: one
//! marker byte per UTF-16 code unit in the primary stream, with low-order
//! bytes of non-ASCII units accumulated in an overflow stream that is
//! appended as a contiguous block after the markers (see [`strings`]).
//!
//! Big integers, big decimals and byte arrays carry a compacted length and
//! raw bytes; big decimals append a compacted scale. Enum constants are
//! written as their ordinal; the decoder is handed the caller's
//! ordinal-ordered constant list and has no reflection of its own.
//!
//! The writer owns its output buffer and the overflow scratch; neither the
//! writer nor the reader is safe to share across threads.

pub mod reader;
pub mod strings;
pub mod tag;
pub mod width;
pub mod writer;

pub use reader::CompactReader;
pub use tag::Family;
pub use writer::CompactWriter;
