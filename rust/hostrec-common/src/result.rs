//! `Result` alias and field-configuration checks.
//!
//! Field codecs validate their layout parameters (digit counts, byte
//! widths, charset constraints) once at construction so encode and decode
//! can assume a well-formed field. `verify_arg!` performs such a check and,
//! on failure, captures the parameter name and the failing condition text
//! into the [`InvalidArgument`](crate::error::ErrorKind::InvalidArgument)
//! diagnostic.

pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// Checks a configuration precondition, e.g.
/// `verify_arg!(byte_len, byte_len % 2 == 0)`. Propagates an
/// `InvalidArgument` error naming `byte_len` and quoting the condition.
#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {{
        let ok = $expr;
        $crate::result::check_arg(ok, stringify!($name), stringify!($expr))?;
    }};
}

#[inline]
pub fn check_arg(ok: bool, name: &str, condition: &str) -> Result<()> {
    if ok { Ok(()) } else { arg_rejected(name, condition) }
}

#[cold]
fn arg_rejected(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::Error::invalid_arg(name, condition))
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;

    fn configure(frac_digits: u32) -> crate::Result<u32> {
        verify_arg!(frac_digits, frac_digits <= 9);
        Ok(frac_digits)
    }

    #[test]
    fn test_verify_arg_reports_name_and_condition() {
        assert_eq!(configure(4).unwrap(), 4);
        let err = configure(12).unwrap_err();
        match err.kind() {
            ErrorKind::InvalidArgument { name, message } => {
                assert_eq!(name, "frac_digits");
                assert_eq!(message, "frac_digits <= 9");
            }
            other => panic!("unexpected error kind: {other:?}"),
        }
    }
}
