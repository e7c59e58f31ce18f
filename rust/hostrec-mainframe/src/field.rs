use hostrec_common::{Result, error::Error, verify_arg};
use hostrec_decimal::Decimal;

/// Validated digit-count configuration shared by the numeric field types.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldSpec {
    pub int_digits: u32,
    pub frac_digits: u32,
}

impl FieldSpec {
    pub fn new(int_digits: u32, frac_digits: u32) -> Result<FieldSpec> {
        let total = int_digits + frac_digits;
        verify_arg!(digits, total >= 1);
        verify_arg!(digits, total <= crate::MAX_DIGITS);
        Ok(FieldSpec {
            int_digits,
            frac_digits,
        })
    }

    #[inline]
    pub fn digits(&self) -> u32 {
        self.int_digits + self.frac_digits
    }
}

/// Renders `value` at the field's scale as a sign and a left-zero-padded
/// digit array of exactly `digits` entries, values `0..=9`.
///
/// Fails with a capacity error when the magnitude needs more digits, or when
/// bringing the value to the field's scale would drop nonzero fractional
/// digits.
pub(crate) fn render_digits(
    value: &Decimal,
    digits: u32,
    frac_digits: u32,
) -> Result<(bool, Vec<u8>)> {
    let capacity_err = || Error::capacity(value.to_string(), digits as usize);
    let scaled = value.rescale(frac_digits).map_err(|_| capacity_err())?;
    let mut magnitude = scaled.unscaled().unsigned_abs();
    if magnitude >= 10u128.pow(digits) {
        return Err(capacity_err());
    }
    let mut out = vec![0u8; digits as usize];
    for slot in out.iter_mut().rev() {
        *slot = (magnitude % 10) as u8;
        magnitude /= 10;
    }
    Ok((scaled.is_negative(), out))
}

/// Folds decoded digit values into the field's decimal value.
pub(crate) fn collect_digits(digits: &[u8], negative: bool, frac_digits: u32) -> Decimal {
    let mut unscaled: i128 = 0;
    for &d in digits {
        unscaled = unscaled * 10 + d as i128;
    }
    if negative {
        unscaled = -unscaled;
    }
    Decimal::new(unscaled, frac_digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_spec_bounds() {
        assert!(FieldSpec::new(0, 0).is_err());
        assert!(FieldSpec::new(1, 0).is_ok());
        assert!(FieldSpec::new(29, 2).is_ok());
        assert!(FieldSpec::new(30, 2).is_err());
    }

    #[test]
    fn test_render_digits_pads_and_checks() {
        let (neg, digits) = render_digits(&Decimal::new(-12345, 2), 7, 2).unwrap();
        assert!(neg);
        assert_eq!(digits, &[0, 0, 1, 2, 3, 4, 5]);

        // Magnitude overflow and silent precision loss are both rejected.
        assert!(render_digits(&Decimal::new(1000, 0), 3, 0).is_err());
        assert!(render_digits(&Decimal::new(105, 2), 3, 1).is_err());
        // Trailing zero fractional digits rescale freely.
        let (neg, digits) = render_digits(&Decimal::new(150, 2), 3, 1).unwrap();
        assert!(!neg);
        assert_eq!(digits, &[0, 1, 5]);
    }

    #[test]
    fn test_collect_digits() {
        assert_eq!(collect_digits(&[0, 0, 4, 2], false, 0), Decimal::new(42, 0));
        assert_eq!(
            collect_digits(&[1, 2, 3, 4, 5], true, 2),
            Decimal::new(-12345, 2)
        );
    }
}
