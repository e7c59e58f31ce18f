//! Two-stream string packing.
//!
//! Each UTF-16 code unit contributes exactly one byte to the primary
//! (marker) stream, keeping the common ASCII case single-byte:
//!
//! - `<= 0x007F`: the unit itself.
//! - `<= 0x3FFF`: `0x80 | high_bits` (markers `0x80..=0xBF`), with the low
//!   byte pushed to the overflow stream.
//! - above that: the `0xC0` marker, with the high and low bytes pushed to
//!   the overflow stream.
//!
//! After a string's markers are flushed, its overflow bytes are appended as
//! one contiguous trailing block. The reader scans the markers first to
//! learn how many overflow bytes exist, then re-pairs them in order. Markers
//! `0xC1..=0xFF` never occur in well-formed data.

use hostrec_bytes::ByteBuffer;

pub const TWO_BYTE_MARKER: u8 = 0x80;
pub const THREE_BYTE_MARKER: u8 = 0xC0;

/// Encodes one code unit: marker to `primary`, spill bytes to `overflow`.
#[inline]
pub fn encode_unit(unit: u16, primary: &mut ByteBuffer, overflow: &mut Vec<u8>) {
    if unit <= 0x007F {
        primary.put_u8(unit as u8);
    } else if unit <= 0x3FFF {
        primary.put_u8(TWO_BYTE_MARKER | (unit >> 8) as u8);
        overflow.push(unit as u8);
    } else {
        primary.put_u8(THREE_BYTE_MARKER);
        overflow.push((unit >> 8) as u8);
        overflow.push(unit as u8);
    }
}

/// Number of overflow bytes paired with a primary byte, or `None` for a
/// marker outside the format.
#[inline]
pub fn overflow_len(marker: u8) -> Option<usize> {
    match marker {
        0x00..=0x7F => Some(0),
        0x80..=0xBF => Some(1),
        THREE_BYTE_MARKER => Some(2),
        _ => None,
    }
}

/// Re-pairs a primary byte with its overflow bytes into a code unit. The
/// marker must be well-formed and `overflow` must hold enough bytes.
#[inline]
pub fn decode_unit(marker: u8, overflow: &mut impl Iterator<Item = u8>) -> u16 {
    match marker {
        0x00..=0x7F => marker as u16,
        0x80..=0xBF => {
            let low = overflow.next().unwrap_or(0);
            (((marker & 0x3F) as u16) << 8) | low as u16
        }
        _ => {
            let high = overflow.next().unwrap_or(0);
            let low = overflow.next().unwrap_or(0);
            ((high as u16) << 8) | low as u16
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_classes() {
        let cases: &[(u16, u8, &[u8])] = &[
            (0x0041, 0x41, &[]),
            (0x007F, 0x7F, &[]),
            (0x0080, 0x80, &[0x80]),
            (0x1234, 0x92, &[0x34]),
            (0x3FFF, 0xBF, &[0xFF]),
            (0x4000, 0xC0, &[0x40, 0x00]),
            (0xFFFF, 0xC0, &[0xFF, 0xFF]),
        ];
        for &(unit, marker_expected, overflow_expected) in cases {
            let mut primary = ByteBuffer::with_capacity(4);
            let mut overflow = Vec::new();
            encode_unit(unit, &mut primary, &mut overflow);
            assert_eq!(primary.as_slice(), &[marker_expected], "unit {unit:#06X}");
            assert_eq!(overflow, overflow_expected, "unit {unit:#06X}");

            let marker = primary.as_slice()[0];
            assert_eq!(overflow_len(marker), Some(overflow.len()));
            let mut it = overflow.iter().copied();
            assert_eq!(decode_unit(marker, &mut it), unit);
        }
    }

    #[test]
    fn test_bad_markers() {
        for marker in 0xC1..=0xFF {
            assert_eq!(overflow_len(marker), None);
        }
    }

    #[test]
    fn test_random_unit_round_trip() {
        for _ in 0..5000 {
            let unit = fastrand::u16(..);
            let mut primary = ByteBuffer::with_capacity(1);
            let mut overflow = Vec::new();
            encode_unit(unit, &mut primary, &mut overflow);
            let mut it = overflow.iter().copied();
            assert_eq!(decode_unit(primary.as_slice()[0], &mut it), unit);
            assert!(it.next().is_none());
        }
    }
}
