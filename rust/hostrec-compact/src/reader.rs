//! Tag-byte reader: mirrors every writer operation with a typed read.
//!
//! The reader inspects only the tag byte to learn how many content bytes
//! follow and how to reconstruct the value (sign-extension for integers,
//! low-end zero padding for floats). A tag whose family does not match the
//! requested operation, a variant outside the family's legal set, or a
//! truncated content span all fail with a malformed-data error carrying the
//! tag's byte offset.

use hostrec_bytes::ByteBuffer;
use hostrec_common::{Result, error::Error};
use hostrec_decimal::Decimal;

use crate::strings;
use crate::tag::{self, Family};

const FORMAT: &str = "compact";

/// Reader for the compact tag-byte format.
pub struct CompactReader {
    buf: ByteBuffer,
}

impl CompactReader {
    /// Reads from `buf` starting at its current cursor.
    pub fn new(buf: ByteBuffer) -> CompactReader {
        CompactReader { buf }
    }

    /// Copies `bytes` into an owned buffer and reads from the start.
    pub fn from_slice(bytes: &[u8]) -> CompactReader {
        let mut buf = ByteBuffer::with_capacity(bytes.len().max(1));
        buf.put_slice(bytes);
        buf.set_position(0);
        CompactReader { buf }
    }

    pub fn position(&self) -> usize {
        self.buf.position()
    }

    pub fn into_buffer(self) -> ByteBuffer {
        self.buf
    }

    pub fn read_bool(&mut self) -> Result<Option<bool>> {
        let (offset, variant) = self.read_tag(Family::Boolean)?;
        match variant {
            tag::NULL => Ok(None),
            tag::ZERO => Ok(Some(false)),
            tag::TRUE => Ok(Some(true)),
            _ => Err(self.bad_variant(Family::Boolean, variant, offset)),
        }
    }

    pub fn read_i8(&mut self) -> Result<Option<i8>> {
        let (offset, variant) = self.read_tag(Family::Byte)?;
        match variant {
            tag::NULL => Ok(None),
            tag::ZERO => Ok(Some(0)),
            tag::PRESENT => Ok(Some(self.buf.get_u8()? as i8)),
            _ => Err(self.bad_variant(Family::Byte, variant, offset)),
        }
    }

    pub fn read_i16(&mut self) -> Result<Option<i16>> {
        Ok(self.read_signed(Family::Short, 2)?.map(|v| v as i16))
    }

    /// Reads a UTF-16 code unit.
    pub fn read_char(&mut self) -> Result<Option<u16>> {
        Ok(self.read_unsigned(Family::Char, 2)?.map(|v| v as u16))
    }

    pub fn read_i32(&mut self) -> Result<Option<i32>> {
        Ok(self.read_signed(Family::Int, 4)?.map(|v| v as i32))
    }

    pub fn read_i64(&mut self) -> Result<Option<i64>> {
        self.read_signed(Family::Long, 8)
    }

    pub fn read_f32(&mut self) -> Result<Option<f32>> {
        Ok(self
            .read_float_bits(Family::Float, 4)?
            .map(|bits| f32::from_bits(bits as u32)))
    }

    pub fn read_f64(&mut self) -> Result<Option<f64>> {
        Ok(self.read_float_bits(Family::Double, 8)?.map(f64::from_bits))
    }

    /// Reads a timestamp as milliseconds since the epoch.
    pub fn read_date_millis(&mut self) -> Result<Option<i64>> {
        self.read_signed(Family::Date, 8)
    }

    pub fn read_str(&mut self) -> Result<Option<String>> {
        let (offset, variant) = self.read_tag(Family::String)?;
        match variant {
            tag::NULL => return Ok(None),
            tag::ZERO => return Ok(Some(String::new())),
            tag::PRESENT => {}
            _ => return Err(self.bad_variant(Family::String, variant, offset)),
        }
        let count = self.read_length()?;

        let primary_start = self.buf.position();
        let mut primary = vec![0u8; count];
        self.buf.get_slice(&mut primary)?;

        let mut overflow_count = 0;
        for (i, &marker) in primary.iter().enumerate() {
            match strings::overflow_len(marker) {
                Some(n) => overflow_count += n,
                None => {
                    return Err(Error::malformed_data(
                        FORMAT,
                        primary_start + i,
                        &[marker],
                        format!("string marker byte 0x{marker:02X}"),
                    ));
                }
            }
        }
        let mut overflow = vec![0u8; overflow_count];
        self.buf.get_slice(&mut overflow)?;

        let mut spill = overflow.iter().copied();
        let units: Vec<u16> = primary
            .iter()
            .map(|&marker| strings::decode_unit(marker, &mut spill))
            .collect();
        String::from_utf16(&units)
            .map(Some)
            .map_err(|_| {
                Error::malformed_data(
                    FORMAT,
                    primary_start,
                    &primary,
                    "string decodes to an invalid UTF-16 sequence",
                )
            })
    }

    pub fn read_byte_array(&mut self) -> Result<Option<Vec<u8>>> {
        self.read_len_prefixed(Family::ByteArray)
    }

    /// Reads a big integer as its big-endian two's-complement byte string
    /// (empty means zero).
    pub fn read_big_integer(&mut self) -> Result<Option<Vec<u8>>> {
        self.read_len_prefixed(Family::BigInteger)
    }

    /// Reads a big decimal as an unscaled big-endian two's-complement byte
    /// string and a scale.
    pub fn read_big_decimal(&mut self) -> Result<Option<(Vec<u8>, i32)>> {
        let (offset, variant) = self.read_tag(Family::BigDecimal)?;
        match variant {
            tag::NULL => Ok(None),
            tag::ZERO => Ok(Some((Vec::new(), 0))),
            tag::PRESENT => {
                let len = self.read_length()?;
                let mut unscaled = vec![0u8; len];
                self.buf.get_slice(&mut unscaled)?;
                let scale = match self.read_signed(Family::Int, 4)? {
                    Some(scale) => scale as i32,
                    None => {
                        return Err(self.malformed(offset, "null scale in big-decimal"));
                    }
                };
                Ok(Some((unscaled, scale)))
            }
            _ => Err(self.bad_variant(Family::BigDecimal, variant, offset)),
        }
    }

    /// [`read_big_decimal`](Self::read_big_decimal) into a [`Decimal`],
    /// failing when the unscaled value is wider than 128 bits or the scale
    /// is negative.
    pub fn read_decimal(&mut self) -> Result<Option<Decimal>> {
        let offset = self.buf.position();
        match self.read_big_decimal()? {
            None => Ok(None),
            Some((unscaled, scale)) => {
                if unscaled.len() > 16 || scale < 0 {
                    return Err(self.malformed(offset, "big-decimal outside the Decimal range"));
                }
                Ok(Some(Decimal::from_be_bytes(&unscaled, scale as u32)?))
            }
        }
    }

    /// Reads an enum constant's ordinal.
    pub fn read_enum_ordinal(&mut self) -> Result<Option<u32>> {
        Ok(self.read_unsigned(Family::Enum, 4)?.map(|v| v as u32))
    }

    /// Reads an enum constant by indexing the caller's constant list.
    ///
    /// `constants` must be ordered exactly as it was on the encoding side:
    /// the wire carries only the ordinal, so reordering, inserting or
    /// removing constants between encode and decode silently misreads data.
    /// Keeping the order stable is the caller's obligation. An ordinal
    /// beyond the list is a malformed-data error.
    pub fn read_enum<'a, T>(&mut self, constants: &'a [T]) -> Result<Option<&'a T>> {
        let offset = self.buf.position();
        match self.read_enum_ordinal()? {
            None => Ok(None),
            Some(ordinal) => constants.get(ordinal as usize).map(Some).ok_or_else(|| {
                self.malformed(
                    offset,
                    format!(
                        "enum ordinal {ordinal} beyond the {} known constant(s)",
                        constants.len()
                    ),
                )
            }),
        }
    }

    /// Reads the null/present marker for a nested object; `true` means the
    /// caller reads the object's fields next.
    pub fn read_object_header(&mut self) -> Result<bool> {
        let (offset, variant) = self.read_tag(Family::Object)?;
        match variant {
            tag::NULL => Ok(false),
            tag::ZERO => Ok(true),
            _ => Err(self.bad_variant(Family::Object, variant, offset)),
        }
    }

    fn read_tag(&mut self, expected: Family) -> Result<(usize, u8)> {
        let offset = self.buf.position();
        let byte = self.buf.get_u8()?;
        match Family::from_high_nibble(byte >> 4) {
            Some(family) if family == expected => Ok((offset, byte & 0x0F)),
            Some(family) => Err(Error::malformed_data(
                FORMAT,
                offset,
                &[byte],
                format!("expected a {} tag, found {}", expected.name(), family.name()),
            )),
            None => Err(Error::malformed_data(
                FORMAT,
                offset,
                &[byte],
                format!("expected a {} tag, found family 0xF", expected.name()),
            )),
        }
    }

    fn read_signed(&mut self, family: Family, max_bytes: u8) -> Result<Option<i64>> {
        let (offset, variant) = self.read_tag(family)?;
        match variant {
            tag::NULL => Ok(None),
            tag::ZERO => Ok(Some(0)),
            v if v >= tag::PRESENT && v - tag::PRESENT < max_bytes => {
                let byte_count = (v - tag::PRESENT + 1) as u32;
                let acc = self.content_bits(byte_count)?;
                let shift = 64 - 8 * byte_count;
                Ok(Some(((acc << shift) as i64) >> shift))
            }
            _ => Err(self.bad_variant(family, variant, offset)),
        }
    }

    fn read_unsigned(&mut self, family: Family, max_bytes: u8) -> Result<Option<u64>> {
        let (offset, variant) = self.read_tag(family)?;
        match variant {
            tag::NULL => Ok(None),
            tag::ZERO => Ok(Some(0)),
            v if v >= tag::PRESENT && v - tag::PRESENT < max_bytes => {
                let byte_count = (v - tag::PRESENT + 1) as u32;
                Ok(Some(self.content_bits(byte_count)?))
            }
            _ => Err(self.bad_variant(family, variant, offset)),
        }
    }

    fn read_float_bits(&mut self, family: Family, total_bytes: u8) -> Result<Option<u64>> {
        let (offset, variant) = self.read_tag(family)?;
        match variant {
            tag::NULL => Ok(None),
            tag::ZERO => Ok(Some(0)),
            v if v >= tag::PRESENT && v - tag::PRESENT < total_bytes => {
                let kept = (v - tag::PRESENT + 1) as u32;
                let acc = self.content_bits(kept)?;
                Ok(Some(acc << (8 * (total_bytes as u32 - kept))))
            }
            _ => Err(self.bad_variant(family, variant, offset)),
        }
    }

    fn content_bits(&mut self, byte_count: u32) -> Result<u64> {
        let mut acc = 0u64;
        for _ in 0..byte_count {
            acc = (acc << 8) | self.buf.get_u8()? as u64;
        }
        Ok(acc)
    }

    /// Reads the compacted non-negative length written before string chars,
    /// big integer/decimal bytes and byte arrays.
    fn read_length(&mut self) -> Result<usize> {
        let offset = self.buf.position();
        match self.read_signed(Family::Int, 4)? {
            Some(n) if n > 0 => Ok(n as usize),
            Some(n) => Err(self.malformed(offset, format!("length {n} out of range"))),
            None => Err(self.malformed(offset, "null length")),
        }
    }

    fn read_len_prefixed(&mut self, family: Family) -> Result<Option<Vec<u8>>> {
        let (offset, variant) = self.read_tag(family)?;
        match variant {
            tag::NULL => Ok(None),
            tag::ZERO => Ok(Some(Vec::new())),
            tag::PRESENT => {
                let len = self.read_length()?;
                let mut bytes = vec![0u8; len];
                self.buf.get_slice(&mut bytes)?;
                Ok(Some(bytes))
            }
            _ => Err(self.bad_variant(family, variant, offset)),
        }
    }

    fn bad_variant(&self, family: Family, variant: u8, offset: usize) -> Error {
        Error::malformed_data(
            FORMAT,
            offset,
            &[tag::compose(family, variant)],
            format!("variant 0x{variant:X} out of range for {}", family.name()),
        )
    }

    fn malformed(&self, offset: usize, message: impl Into<String>) -> Error {
        Error::malformed_data(FORMAT, offset, &[], message)
    }
}
