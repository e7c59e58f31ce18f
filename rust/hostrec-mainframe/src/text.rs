//! Fixed-width text fields, space-padded on write and trimmed on read.

use hostrec_bytes::ByteBuffer;
use hostrec_common::{Result, error::Error, verify_arg};

const FORMAT: &str = "text";

/// Character width of a text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// One byte per character, Latin-1. Characters above U+00FF are rejected
    /// on encode.
    SingleByte,
    /// Two bytes per character, UTF-16BE code units.
    DoubleByte,
}

/// A text field occupying exactly `byte_len` bytes on the wire.
#[derive(Debug, Clone, Copy)]
pub struct TextField {
    byte_len: usize,
    charset: Charset,
}

impl TextField {
    pub fn new(byte_len: usize, charset: Charset) -> Result<TextField> {
        verify_arg!(byte_len, byte_len >= 1);
        if charset == Charset::DoubleByte {
            verify_arg!(byte_len, byte_len % 2 == 0);
        }
        Ok(TextField { byte_len, charset })
    }

    #[inline]
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    #[inline]
    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Encodes `value` into the field span, padding the remainder with
    /// spaces. A value whose encoded form is longer than the field is a
    /// capacity error.
    pub fn encode(&self, value: &str, buf: &mut ByteBuffer) -> Result<()> {
        let mut bytes = Vec::with_capacity(self.byte_len);
        match self.charset {
            Charset::SingleByte => {
                for c in value.chars() {
                    let code = c as u32;
                    if code > 0xFF {
                        return Err(Error::invalid_arg(
                            "value",
                            "character outside the single-byte charset",
                        ));
                    }
                    bytes.push(code as u8);
                }
            }
            Charset::DoubleByte => {
                for unit in value.encode_utf16() {
                    bytes.extend_from_slice(&unit.to_be_bytes());
                }
            }
        }
        if bytes.len() > self.byte_len {
            return Err(Error::capacity(value.to_string(), self.byte_len));
        }
        let pad: &[u8] = match self.charset {
            Charset::SingleByte => &[0x20],
            Charset::DoubleByte => &[0x00, 0x20],
        };
        while bytes.len() < self.byte_len {
            bytes.extend_from_slice(pad);
        }
        buf.put_slice(&bytes);
        Ok(())
    }

    /// Decodes the field span at the buffer cursor, trimming trailing pad
    /// spaces.
    pub fn decode(&self, buf: &mut ByteBuffer) -> Result<String> {
        let start = buf.position();
        let mut span = vec![0u8; self.byte_len];
        buf.get_slice(&mut span)?;

        let text = match self.charset {
            Charset::SingleByte => span.iter().map(|&b| b as char).collect::<String>(),
            Charset::DoubleByte => {
                let units: Vec<u16> = span
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect();
                match String::from_utf16(&units) {
                    Ok(text) => text,
                    Err(_) => {
                        buf.set_position(start);
                        return Err(Error::malformed_data(
                            FORMAT,
                            start,
                            &span,
                            "invalid UTF-16 code unit sequence",
                        ));
                    }
                }
            }
        };
        Ok(text.trim_end_matches(' ').to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostrec_common::error::ErrorKind;

    #[test]
    fn test_single_byte_pad_and_trim() {
        let field = TextField::new(8, Charset::SingleByte).unwrap();
        let mut buf = ByteBuffer::new();
        field.encode("abc", &mut buf).unwrap();
        assert_eq!(buf.as_slice(), b"abc     ");
        buf.set_position(0);
        assert_eq!(field.decode(&mut buf).unwrap(), "abc");
    }

    #[test]
    fn test_single_byte_latin1() {
        let field = TextField::new(4, Charset::SingleByte).unwrap();
        let mut buf = ByteBuffer::new();
        field.encode("n\u{00E9}t", &mut buf).unwrap();
        assert_eq!(buf.as_slice(), &[0x6E, 0xE9, 0x74, 0x20]);
        buf.set_position(0);
        assert_eq!(field.decode(&mut buf).unwrap(), "n\u{00E9}t");

        assert!(field.encode("\u{1234}", &mut buf).is_err());
    }

    #[test]
    fn test_double_byte_round_trip() {
        let field = TextField::new(10, Charset::DoubleByte).unwrap();
        let mut buf = ByteBuffer::new();
        field.encode("A\u{1234}", &mut buf).unwrap();
        assert_eq!(
            buf.as_slice(),
            &[0x00, 0x41, 0x12, 0x34, 0x00, 0x20, 0x00, 0x20, 0x00, 0x20]
        );
        buf.set_position(0);
        assert_eq!(field.decode(&mut buf).unwrap(), "A\u{1234}");
    }

    #[test]
    fn test_overflow_is_capacity_error() {
        let field = TextField::new(2, Charset::SingleByte).unwrap();
        let mut buf = ByteBuffer::new();
        assert!(matches!(
            field.encode("abc", &mut buf).unwrap_err().kind(),
            ErrorKind::Capacity { .. }
        ));
    }

    #[test]
    fn test_double_byte_lone_surrogate() {
        let field = TextField::new(2, Charset::DoubleByte).unwrap();
        let mut buf = ByteBuffer::new();
        buf.put_slice(&[0xD8, 0x00]);
        buf.set_position(0);
        let err = field.decode(&mut buf).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MalformedData { .. }));
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn test_configuration_errors() {
        assert!(TextField::new(0, Charset::SingleByte).is_err());
        assert!(TextField::new(3, Charset::DoubleByte).is_err());
    }
}
