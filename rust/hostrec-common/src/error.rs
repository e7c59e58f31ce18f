use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    /// Malformed-input error for a decoded field, carrying the diagnostic
    /// triple: the byte offset of the field start, the format name and a hex
    /// rendering of the offending span. Interchange data is frequently
    /// corrupt and the offset is essential for triage.
    pub fn malformed_data(
        format: &'static str,
        offset: usize,
        span: &[u8],
        message: impl Into<String>,
    ) -> Error {
        Error(
            ErrorKind::MalformedData {
                format,
                offset,
                span_hex: hex_string(span),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn capacity(value: impl Into<String>, width: usize) -> Error {
        Error(
            ErrorKind::Capacity {
                value: value.into(),
                width,
            }
            .into(),
        )
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Io {
                context: context.into(),
                source,
            }
            .into(),
        )
    }

    pub fn eof(offset: usize, needed: usize, available: usize) -> Error {
        Error(
            ErrorKind::UnexpectedEof {
                offset,
                needed,
                available,
            }
            .into(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("malformed {format} field at offset {offset} [{span_hex}]: {message}")]
    MalformedData {
        format: &'static str,
        offset: usize,
        span_hex: String,
        message: String,
    },

    #[error("value {value} does not fit in a field of width {width}")]
    Capacity { value: String, width: usize },

    #[error("IO error for '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },

    #[error("unexpected end of data at offset {offset}: needed {needed} byte(s), {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}

/// Uppercase hex rendering of a byte span, e.g. `[0x12, 0xD4]` -> `"12D4"`.
pub fn hex_string(span: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut s = String::with_capacity(span.len() * 2);
    for &b in span {
        s.push(HEX[(b >> 4) as usize] as char);
        s.push(HEX[(b & 0x0F) as usize] as char);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_string() {
        assert_eq!(hex_string(&[]), "");
        assert_eq!(hex_string(&[0x00, 0x7F, 0xC4, 0x0D]), "007FC40D");
    }

    #[test]
    fn test_malformed_data_display() {
        let err = Error::malformed_data("packed", 16, &[0x12, 0x3A], "bad digit nibble");
        assert_eq!(
            err.to_string(),
            "malformed packed field at offset 16 [123A]: bad digit nibble"
        );
    }
}
