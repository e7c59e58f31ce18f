//! Tag-byte writer: one operation per field value, smallest encoding that
//! round-trips exactly.

use std::io::Write;

use hostrec_bytes::ByteBuffer;
use hostrec_common::Result;
use hostrec_decimal::Decimal;
use num_traits::{AsPrimitive, PrimInt};

use crate::strings;
use crate::tag::{self, Family};
use crate::width;

/// Writer for the compact tag-byte format.
///
/// The writer owns its output buffer and the string overflow scratch; each
/// `write_*` call appends one complete tagged value. Calls are infallible —
/// the buffer grows on demand — so a record's fields can be written
/// back-to-back and the finished bytes flushed in one step.
pub struct CompactWriter {
    out: ByteBuffer,
    overflow: Vec<u8>,
}

impl CompactWriter {
    pub fn new() -> CompactWriter {
        CompactWriter {
            out: ByteBuffer::new(),
            overflow: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> CompactWriter {
        CompactWriter {
            out: ByteBuffer::with_capacity(capacity),
            overflow: Vec::new(),
        }
    }

    /// Returns the encoded bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        self.out.as_slice()
    }

    /// Number of encoded bytes written so far.
    pub fn len(&self) -> usize {
        self.out.size()
    }

    pub fn is_empty(&self) -> bool {
        self.out.size() == 0
    }

    /// Discards the written content, keeping the allocations.
    pub fn reset(&mut self) {
        self.out.reset();
        self.overflow.clear();
    }

    pub fn into_buffer(self) -> ByteBuffer {
        self.out
    }

    /// Writes the encoded bytes to `sink`.
    pub fn flush_to(&self, sink: &mut impl Write) -> Result<()> {
        self.out.transfer_to(sink)
    }

    pub fn write_bool(&mut self, value: Option<bool>) {
        match value {
            None => self.put_tag(Family::Boolean, tag::NULL),
            Some(false) => self.put_tag(Family::Boolean, tag::ZERO),
            Some(true) => self.put_tag(Family::Boolean, tag::TRUE),
        }
    }

    pub fn write_i8(&mut self, value: Option<i8>) {
        match value {
            None => self.put_tag(Family::Byte, tag::NULL),
            Some(0) => self.put_tag(Family::Byte, tag::ZERO),
            Some(v) => {
                self.put_tag(Family::Byte, tag::PRESENT);
                self.out.put_u8(v as u8);
            }
        }
    }

    pub fn write_i16(&mut self, value: Option<i16>) {
        self.put_signed(Family::Short, value);
    }

    /// Writes a UTF-16 code unit (zero-extended on decode).
    pub fn write_char(&mut self, value: Option<u16>) {
        match value {
            None => self.put_tag(Family::Char, tag::NULL),
            Some(v) => self.put_unsigned(Family::Char, v as u64),
        }
    }

    pub fn write_i32(&mut self, value: Option<i32>) {
        self.put_signed(Family::Int, value);
    }

    pub fn write_i64(&mut self, value: Option<i64>) {
        self.put_signed(Family::Long, value);
    }

    pub fn write_f32(&mut self, value: Option<f32>) {
        match value {
            None => self.put_tag(Family::Float, tag::NULL),
            Some(v) => self.put_float_bits(Family::Float, v.to_bits() as u64, 4),
        }
    }

    pub fn write_f64(&mut self, value: Option<f64>) {
        match value {
            None => self.put_tag(Family::Double, tag::NULL),
            Some(v) => self.put_float_bits(Family::Double, v.to_bits(), 8),
        }
    }

    /// Writes a timestamp as milliseconds since the epoch.
    pub fn write_date_millis(&mut self, value: Option<i64>) {
        self.put_signed(Family::Date, value);
    }

    /// Writes a string as a compacted char count, one marker byte per UTF-16
    /// code unit, and the trailing overflow block (see [`crate::strings`]).
    pub fn write_str(&mut self, value: Option<&str>) {
        let Some(s) = value else {
            self.put_tag(Family::String, tag::NULL);
            return;
        };
        if s.is_empty() {
            self.put_tag(Family::String, tag::ZERO);
            return;
        }
        self.put_tag(Family::String, tag::PRESENT);
        let count = s.encode_utf16().count();
        self.put_signed(Family::Int, Some(count as i32));
        self.overflow.clear();
        for unit in s.encode_utf16() {
            strings::encode_unit(unit, &mut self.out, &mut self.overflow);
        }
        self.out.put_slice(&self.overflow);
    }

    pub fn write_byte_array(&mut self, value: Option<&[u8]>) {
        self.put_len_prefixed(Family::ByteArray, value);
    }

    /// Writes a big integer given as its minimal big-endian two's-complement
    /// byte string (empty means zero).
    pub fn write_big_integer(&mut self, value: Option<&[u8]>) {
        self.put_len_prefixed(Family::BigInteger, value);
    }

    /// Writes a big decimal given as an unscaled big-endian two's-complement
    /// byte string and a scale. A zero unscaled value (empty bytes) is
    /// normalized to the zero variant with no scale.
    pub fn write_big_decimal(&mut self, value: Option<(&[u8], i32)>) {
        let Some((unscaled, scale)) = value else {
            self.put_tag(Family::BigDecimal, tag::NULL);
            return;
        };
        if unscaled.is_empty() {
            self.put_tag(Family::BigDecimal, tag::ZERO);
            return;
        }
        self.put_tag(Family::BigDecimal, tag::PRESENT);
        self.put_signed(Family::Int, Some(unscaled.len() as i32));
        self.out.put_slice(unscaled);
        self.put_signed(Family::Int, Some(scale));
    }

    /// [`write_big_decimal`](Self::write_big_decimal) for values held as a
    /// [`Decimal`].
    pub fn write_decimal(&mut self, value: Option<&Decimal>) {
        match value {
            None => self.write_big_decimal(None),
            Some(d) => {
                let bytes = d.to_be_bytes();
                self.write_big_decimal(Some((&bytes, d.scale() as i32)));
            }
        }
    }

    /// Writes an enum constant's ordinal.
    ///
    /// The ordinal is only meaningful against the constant list the decoder
    /// is handed; if that list's order changes between encode and decode,
    /// data is silently misread. Keeping the order stable is the caller's
    /// obligation.
    pub fn write_enum_ordinal(&mut self, ordinal: Option<u32>) {
        match ordinal {
            None => self.put_tag(Family::Enum, tag::NULL),
            Some(v) => self.put_unsigned(Family::Enum, v as u64),
        }
    }

    /// Writes the null/present marker for a nested object. For a present
    /// object, the caller writes the object's fields next, in the
    /// schema-derived order both sides agree on.
    pub fn write_object_header(&mut self, present: bool) {
        let variant = if present { tag::ZERO } else { tag::NULL };
        self.put_tag(Family::Object, variant);
    }

    #[inline]
    fn put_tag(&mut self, family: Family, variant: u8) {
        self.out.put_u8(tag::compose(family, variant));
    }

    fn put_signed<T>(&mut self, family: Family, value: Option<T>)
    where
        T: PrimInt + AsPrimitive<i64>,
    {
        let Some(v) = value else {
            self.put_tag(family, tag::NULL);
            return;
        };
        let v: i64 = v.as_();
        if v == 0 {
            self.put_tag(family, tag::ZERO);
            return;
        }
        let byte_count = width::sign_extended_width(v);
        self.put_tag(family, tag::PRESENT + (byte_count - 1) as u8);
        self.put_content_bytes(v as u64, byte_count);
    }

    fn put_unsigned(&mut self, family: Family, value: u64) {
        if value == 0 {
            self.put_tag(family, tag::ZERO);
            return;
        }
        let byte_count = width::zero_extended_width(value);
        self.put_tag(family, tag::PRESENT + (byte_count - 1) as u8);
        self.put_content_bytes(value, byte_count);
    }

    fn put_float_bits(&mut self, family: Family, bits: u64, total_bytes: u32) {
        if bits == 0 {
            self.put_tag(family, tag::ZERO);
            return;
        }
        let kept = width::float_kept_width(bits, total_bytes);
        self.put_tag(family, tag::PRESENT + (kept - 1) as u8);
        for i in ((total_bytes - kept)..total_bytes).rev() {
            self.out.put_u8((bits >> (i * 8)) as u8);
        }
    }

    fn put_content_bytes(&mut self, bits: u64, byte_count: u32) {
        for i in (0..byte_count).rev() {
            self.out.put_u8((bits >> (i * 8)) as u8);
        }
    }

    fn put_len_prefixed(&mut self, family: Family, value: Option<&[u8]>) {
        let Some(bytes) = value else {
            self.put_tag(family, tag::NULL);
            return;
        };
        if bytes.is_empty() {
            self.put_tag(family, tag::ZERO);
            return;
        }
        self.put_tag(family, tag::PRESENT);
        self.put_signed(Family::Int, Some(bytes.len() as i32));
        self.out.put_slice(bytes);
    }
}

impl Default for CompactWriter {
    fn default() -> Self {
        Self::new()
    }
}
