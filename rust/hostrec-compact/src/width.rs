//! Minimal content-byte width computation: one leading-filler elimination
//! loop shared by all integer widths, and trailing-zero-byte suppression for
//! float bit patterns.

use num_traits::{AsPrimitive, PrimInt};

/// Smallest byte count whose sign extension reproduces `value`.
///
/// A leading byte can be dropped when it equals the sign-extension filler
/// (`0x00` or `0xFF`) of the bytes that remain, i.e. when the next byte's
/// sign bit already carries the same sign.
pub fn sign_extended_width<T>(value: T) -> u32
where
    T: PrimInt + AsPrimitive<i64>,
{
    let v: i64 = value.as_();
    let mut width = size_of::<T>() as u32;
    while width > 1 {
        let top = (v >> ((width - 1) * 8)) as u8;
        let next_negative = (v >> ((width - 2) * 8)) as u8 & 0x80 != 0;
        let filler = if next_negative { 0xFF } else { 0x00 };
        if top != filler {
            break;
        }
        width -= 1;
    }
    width
}

/// Smallest byte count whose zero extension reproduces `value`.
pub fn zero_extended_width(value: u64) -> u32 {
    (64 - value.leading_zeros()).div_ceil(8).max(1)
}

/// Byte count left after suppressing trailing zero bytes from the low-order
/// end of a `total_bytes`-wide bit pattern. `bits` must be nonzero.
pub fn float_kept_width(bits: u64, total_bytes: u32) -> u32 {
    debug_assert!(bits != 0);
    total_bytes - (bits.trailing_zeros() / 8).min(total_bytes - 1)
}
