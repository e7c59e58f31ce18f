//! Packed (BCD) decimal fields: two digits per byte, with or without a
//! trailing sign nibble.

use hostrec_bytes::ByteBuffer;
use hostrec_common::{Result, error::Error};
use hostrec_decimal::Decimal;

use crate::field::{FieldSpec, collect_digits, render_digits};

/// A signed packed decimal field.
///
/// The terminal byte holds the last digit in its high nibble and the sign in
/// its low nibble (`0xC` positive, `0xD` negative; `0xF` is accepted as
/// positive on decode). The configured digit count is forced odd — when
/// `int_digits + frac_digits` is even, `int_digits` is bumped by one — so the
/// nibble count fills the byte span exactly.
#[derive(Debug, Clone, Copy)]
pub struct PackedField {
    spec: FieldSpec,
}

/// An unsigned packed field: the same nibble packing with no sign nibble.
///
/// The digit count is forced even the same way. Negative values are a
/// capacity error on encode.
///
/// The parity adjustment runs after the [`MAX_DIGITS`](crate::MAX_DIGITS)
/// check on the configured count, so a field configured at 31 digits stores
/// 32; that is the one digit count that can exceed the configured ceiling,
/// and it still fits the `i128`-backed [`Decimal`].
#[derive(Debug, Clone, Copy)]
pub struct UnsignedPackedField {
    spec: FieldSpec,
}

impl PackedField {
    pub fn new(int_digits: u32, frac_digits: u32) -> Result<PackedField> {
        let mut spec = FieldSpec::new(int_digits, frac_digits)?;
        if spec.digits() % 2 == 0 {
            spec.int_digits += 1;
        }
        Ok(PackedField { spec })
    }

    /// Physical length of the encoded field in bytes, sign nibble included.
    #[inline]
    pub fn byte_len(&self) -> usize {
        (self.spec.digits() as usize + 1) / 2
    }

    #[inline]
    pub fn frac_digits(&self) -> u32 {
        self.spec.frac_digits
    }

    /// Digit count after the forced-odd adjustment.
    #[inline]
    pub fn digits(&self) -> u32 {
        self.spec.digits()
    }

    pub fn encode(&self, value: &Decimal, buf: &mut ByteBuffer) -> Result<()> {
        let digits = self.spec.digits();
        let (negative, digit_values) = render_digits(value, digits, self.spec.frac_digits)?;
        let mut bytes = vec![0u8; self.byte_len()];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let hi = digit_values[2 * i];
            let lo = if 2 * i + 1 < digit_values.len() {
                digit_values[2 * i + 1]
            } else {
                // Terminal low nibble is the sign.
                if negative { 0xD } else { 0xC }
            };
            *byte = (hi << 4) | lo;
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

    /// Decodes the field at the buffer cursor, rewinding to the field start
    /// on malformed input.
    pub fn decode(&self, buf: &mut ByteBuffer) -> Result<Decimal> {
        let start = buf.position();
        let mut span = vec![0u8; self.byte_len()];
        buf.get_slice(&mut span)?;

        match self.decode_span(&span) {
            Ok(value) => Ok(value),
            Err(message) => {
                buf.set_position(start);
                Err(Error::malformed_data("packed", start, &span, message))
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
        let digit_count = self.spec.digits() as usize;
        let mut digits = vec![0u8; digit_count];
        let mut negative = false;
        for (i, &byte) in span.iter().enumerate() {
            let hi = byte >> 4;
            let lo = byte & 0x0F;
            if hi > 9 {
                return Err(format!("digit nibble 0x{hi:X} at byte {i}"));
            }
            digits[2 * i] = hi;
            if 2 * i + 1 < digit_count {
                if lo > 9 {
                    return Err(format!("digit nibble 0x{lo:X} at byte {i}"));
                }
                digits[2 * i + 1] = lo;
            } else {
                match lo {
                    0xC | 0xF => {}
                    0xD => negative = true,
                    _ => return Err(format!("sign nibble 0x{lo:X}")),
                }
            }
        }
        Ok(collect_digits(&digits, negative, self.spec.frac_digits))
    }
}

impl UnsignedPackedField {
    pub fn new(int_digits: u32, frac_digits: u32) -> Result<UnsignedPackedField> {
        let mut spec = FieldSpec::new(int_digits, frac_digits)?;
        if spec.digits() % 2 == 1 {
            spec.int_digits += 1;
        }
        Ok(UnsignedPackedField { spec })
    }

    /// Physical length of the encoded field in bytes.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.spec.digits() as usize / 2
    }

    #[inline]
    pub fn frac_digits(&self) -> u32 {
        self.spec.frac_digits
    }

    /// Digit count after the forced-even adjustment.
    #[inline]
    pub fn digits(&self) -> u32 {
        self.spec.digits()
    }

    pub fn encode(&self, value: &Decimal, buf: &mut ByteBuffer) -> Result<()> {
        let digits = self.spec.digits();
        let (negative, digit_values) = render_digits(value, digits, self.spec.frac_digits)?;
        if negative {
            return Err(Error::capacity(value.to_string(), digits as usize));
        }
        let mut bytes = vec![0u8; self.byte_len()];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = (digit_values[2 * i] << 4) | digit_values[2 * i + 1];
        }
        buf.put_slice(&bytes);
        Ok(())
    }

    pub fn encode_i64(&self, value: i64, buf: &mut ByteBuffer) -> Result<()> {
        self.encode(&Decimal::from(value), buf)
    }

    pub fn encode_f64(&self, value: f64, buf: &mut ByteBuffer) -> Result<()> {
        self.encode(&Decimal::from_f64_scaled(value, self.spec.frac_digits)?, buf)
    }

    /// Decodes the field at the buffer cursor, rewinding to the field start
    /// on malformed input.
    pub fn decode(&self, buf: &mut ByteBuffer) -> Result<Decimal> {
        let start = buf.position();
        let mut span = vec![0u8; self.byte_len()];
        buf.get_slice(&mut span)?;

        let mut digits = vec![0u8; self.spec.digits() as usize];
        for (i, &byte) in span.iter().enumerate() {
            let hi = byte >> 4;
            let lo = byte & 0x0F;
            if hi > 9 || lo > 9 {
                let nibble = if hi > 9 { hi } else { lo };
                buf.set_position(start);
                return Err(Error::malformed_data(
                    "unsigned-packed",
                    start,
                    &span,
                    format!("digit nibble 0x{nibble:X} at byte {i}"),
                ));
            }
            digits[2 * i] = hi;
            digits[2 * i + 1] = lo;
        }
        Ok(collect_digits(&digits, false, self.spec.frac_digits))
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
}
