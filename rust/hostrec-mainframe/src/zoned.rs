//! Zoned decimal fields: one byte per digit, digit in the low nibble, zone
//! (`0xF`) or sign in the high nibble of the terminal byte.

use hostrec_bytes::ByteBuffer;
use hostrec_common::{Result, error::Error};
use hostrec_decimal::Decimal;

use crate::field::{FieldSpec, collect_digits, render_digits};

const FORMAT: &str = "zoned";

/// A zoned decimal field of `int_digits + frac_digits` bytes.
///
/// Signed fields carry the sign in the terminal byte's high nibble
/// (`0xC` positive, `0xD` negative); unsigned fields keep `0xF` throughout
/// and reject negative values on encode.
#[derive(Debug, Clone, Copy)]
pub struct ZonedField {
    spec: FieldSpec,
    signed: bool,
}

impl ZonedField {
    pub fn new(int_digits: u32, frac_digits: u32, signed: bool) -> Result<ZonedField> {
        Ok(ZonedField {
            spec: FieldSpec::new(int_digits, frac_digits)?,
            signed,
        })
    }

    /// Physical length of the encoded field in bytes.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.spec.digits() as usize
    }

    #[inline]
    pub fn frac_digits(&self) -> u32 {
        self.spec.frac_digits
    }

    pub fn encode(&self, value: &Decimal, buf: &mut ByteBuffer) -> Result<()> {
        let digits = self.spec.digits();
        let (negative, digit_values) = render_digits(value, digits, self.spec.frac_digits)?;
        if negative && !self.signed {
            return Err(Error::capacity(value.to_string(), digits as usize));
        }
        let terminal = digits as usize - 1;
        let mut bytes = vec![0u8; digits as usize];
        for (i, &d) in digit_values.iter().enumerate() {
            let zone = if i == terminal && self.signed {
                if negative { 0xD0 } else { 0xC0 }
            } else {
                0xF0
            };
            bytes[i] = zone | d;
        }
        buf.put_slice(&bytes);
        Ok(())
    }

    pub fn encode_i64(&self, value: i64, buf: &mut ByteBuffer) -> Result<()> {
        self.encode(&Decimal::from(value), buf)
    }

    /// Encodes a floating-point value, scaling it by `10^frac_digits` and
    /// rounding half away from zero first.
    pub fn encode_f64(&self, value: f64, buf: &mut ByteBuffer) -> Result<()> {
        self.encode(&Decimal::from_f64_scaled(value, self.spec.frac_digits)?, buf)
    }

    /// Decodes the field at the buffer cursor.
    ///
    /// On malformed input the cursor is rewound to the field start and the
    /// error carries the start offset, the format name and a hex dump of the
    /// field bytes.
    pub fn decode(&self, buf: &mut ByteBuffer) -> Result<Decimal> {
        let start = buf.position();
        let mut span = vec![0u8; self.byte_len()];
        buf.get_slice(&mut span)?;

        match self.decode_span(&span) {
            Ok(value) => Ok(value),
            Err(message) => {
                buf.set_position(start);
                Err(Error::malformed_data(FORMAT, start, &span, message))
            }
        }
    }

    pub fn decode_i32(&self, buf: &mut ByteBuffer) -> Result<i32> {
        let value = self.decode_i64(buf)?;
        i32::try_from(value).map_err(|_| Error::invalid_arg("value", "does not fit in i32"))
    }

    pub fn decode_i64(&self, buf: &mut ByteBuffer) -> Result<i64> {
        self.decode(buf)?.to_i64()
    }

    pub fn decode_f64(&self, buf: &mut ByteBuffer) -> Result<f64> {
        Ok(self.decode(buf)?.to_f64())
    }

    fn decode_span(&self, span: &[u8]) -> std::result::Result<Decimal, String> {
        let mut digits = vec![0u8; span.len()];
        let mut negative = false;
        for (i, &byte) in span.iter().enumerate() {
            let zone = byte >> 4;
            let digit = byte & 0x0F;
            if digit > 9 {
                return Err(format!("digit nibble 0x{digit:X} at byte {i}"));
            }
            let terminal = i == span.len() - 1;
            match zone {
                0xF => {}
                0xC if terminal => {}
                0xD if terminal => negative = true,
                _ => return Err(format!("zone nibble 0x{zone:X} at byte {i}")),
            }
            digits[i] = digit;
        }
        Ok(collect_digits(&digits, negative, self.spec.frac_digits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostrec_common::error::ErrorKind;

    #[test]
    fn test_unsigned_wire_form() {
        let field = ZonedField::new(5, 0, false).unwrap();
        let mut buf = ByteBuffer::new();
        field.encode_i64(42, &mut buf).unwrap();
        assert_eq!(buf.as_slice(), &[0xF0, 0xF0, 0xF0, 0xF4, 0xF2]);

        buf.set_position(0);
        assert_eq!(field.decode_i64(&mut buf).unwrap(), 42);
    }

    #[test]
    fn test_signed_wire_form() {
        let field = ZonedField::new(3, 0, true).unwrap();
        let mut buf = ByteBuffer::new();
        field.encode_i64(-7, &mut buf).unwrap();
        assert_eq!(buf.as_slice(), &[0xF0, 0xF0, 0xD7]);
        buf.set_position(0);
        assert_eq!(field.decode_i64(&mut buf).unwrap(), -7);

        buf.reset();
        field.encode_i64(123, &mut buf).unwrap();
        assert_eq!(buf.as_slice(), &[0xF1, 0xF2, 0xC3]);
    }

    #[test]
    fn test_round_trip_boundaries() {
        let field = ZonedField::new(10, 2, true).unwrap();
        for v in [0i64, 1, -1, 999_999_999_999, -999_999_999_999] {
            let mut buf = ByteBuffer::new();
            let value = Decimal::new(v as i128, 2);
            field.encode(&value, &mut buf).unwrap();
            assert_eq!(buf.size(), field.byte_len());
            buf.set_position(0);
            assert_eq!(field.decode(&mut buf).unwrap(), value, "value {v}");
        }
    }

    #[test]
    fn test_random_round_trip() {
        let field = ZonedField::new(9, 3, true).unwrap();
        for _ in 0..500 {
            let v = fastrand::i64(-999_999_999_999..=999_999_999_999);
            let value = Decimal::new(v as i128, 3);
            let mut buf = ByteBuffer::new();
            field.encode(&value, &mut buf).unwrap();
            buf.set_position(0);
            assert_eq!(field.decode(&mut buf).unwrap(), value);
        }
    }

    #[test]
    fn test_capacity_errors() {
        let field = ZonedField::new(3, 0, true).unwrap();
        let mut buf = ByteBuffer::new();
        assert!(matches!(
            field.encode_i64(1000, &mut buf).unwrap_err().kind(),
            ErrorKind::Capacity { .. }
        ));

        let unsigned = ZonedField::new(3, 0, false).unwrap();
        assert!(matches!(
            unsigned.encode_i64(-1, &mut buf).unwrap_err().kind(),
            ErrorKind::Capacity { .. }
        ));
    }

    #[test]
    fn test_malformed_zone_rewinds() {
        let field = ZonedField::new(3, 0, true).unwrap();
        let mut buf = ByteBuffer::new();
        buf.put_slice(&[0xAA, 0xAA]);
        buf.put_slice(&[0xF1, 0x42, 0xC3]);
        buf.set_position(2);
        let err = field.decode(&mut buf).unwrap_err();
        match err.kind() {
            ErrorKind::MalformedData {
                format,
                offset,
                span_hex,
                ..
            } => {
                assert_eq!(*format, "zoned");
                assert_eq!(*offset, 2);
                assert_eq!(span_hex, "F142C3");
            }
            other => panic!("unexpected error kind: {other:?}"),
        }
        assert_eq!(buf.position(), 2);
    }

    #[test]
    fn test_bad_digit_nibble() {
        let field = ZonedField::new(2, 0, false).unwrap();
        let mut buf = ByteBuffer::new();
        buf.put_slice(&[0xF1, 0xFA]);
        buf.set_position(0);
        assert!(matches!(
            field.decode(&mut buf).unwrap_err().kind(),
            ErrorKind::MalformedData { .. }
        ));
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(ZonedField::new(0, 0, true).is_err());
        assert!(ZonedField::new(32, 0, true).is_err());
        assert!(ZonedField::new(16, 16, true).is_err());
    }
}
