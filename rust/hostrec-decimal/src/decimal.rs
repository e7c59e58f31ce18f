use std::fmt;
use std::str::FromStr;

use hostrec_common::{Result, error::Error};

/// An exact decimal value: `unscaled * 10^(-scale)`.
///
/// Two decimals compare equal when they denote the same numeric value,
/// regardless of scale: `Decimal::new(4200, 2) == Decimal::new(42, 0)`.
#[derive(Debug, Clone, Copy)]
pub struct Decimal {
    unscaled: i128,
    scale: u32,
}

/// Largest number of significant decimal digits an `i128` unscaled value
/// can always hold.
pub const MAX_DIGITS: u32 = 38;

fn pow10(n: u32) -> Option<i128> {
    10i128.checked_pow(n)
}

impl Decimal {
    pub const ZERO: Decimal = Decimal {
        unscaled: 0,
        scale: 0,
    };

    pub fn new(unscaled: i128, scale: u32) -> Decimal {
        Decimal { unscaled, scale }
    }

    /// Converts a binary floating-point value into a decimal at the given
    /// scale: the value is multiplied by `10^scale` and rounded half away
    /// from zero. Fails for non-finite input or magnitudes beyond `i128`.
    pub fn from_f64_scaled(value: f64, scale: u32) -> Result<Decimal> {
        if !value.is_finite() {
            return Err(Error::invalid_arg("value", "not a finite number"));
        }
        let scaled = (value * 10f64.powi(scale as i32)).round();
        if scaled >= i128::MAX as f64 || scaled <= i128::MIN as f64 {
            return Err(Error::invalid_arg("value", "magnitude exceeds 38 digits"));
        }
        Ok(Decimal {
            unscaled: scaled as i128,
            scale,
        })
    }

    #[inline]
    pub fn unscaled(&self) -> i128 {
        self.unscaled
    }

    #[inline]
    pub fn scale(&self) -> u32 {
        self.scale
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.unscaled == 0
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.unscaled < 0
    }

    /// Returns the same numeric value at a different scale.
    ///
    /// Scaling up multiplies the unscaled value; scaling down is only
    /// possible when the dropped fractional digits are all zero. Either
    /// violation fails, nothing is ever rounded away silently.
    pub fn rescale(&self, scale: u32) -> Result<Decimal> {
        if scale == self.scale {
            return Ok(*self);
        }
        if scale > self.scale {
            let factor = pow10(scale - self.scale)
                .ok_or_else(|| Error::invalid_arg("scale", "rescale overflows 38 digits"))?;
            let unscaled = self
                .unscaled
                .checked_mul(factor)
                .ok_or_else(|| Error::invalid_arg("scale", "rescale overflows 38 digits"))?;
            Ok(Decimal { unscaled, scale })
        } else {
            let factor = pow10(self.scale - scale)
                .ok_or_else(|| Error::invalid_arg("scale", "rescale overflows 38 digits"))?;
            if self.unscaled % factor != 0 {
                return Err(Error::invalid_arg(
                    "scale",
                    "rescale would drop nonzero fractional digits",
                ));
            }
            Ok(Decimal {
                unscaled: self.unscaled / factor,
                scale,
            })
        }
    }

    /// Returns the value as an `i64`, failing if it has a nonzero fractional
    /// part or does not fit.
    pub fn to_i64(&self) -> Result<i64> {
        let whole = self.rescale(0)?;
        i64::try_from(whole.unscaled)
            .map_err(|_| Error::invalid_arg("value", "does not fit in i64"))
    }

    /// Returns the nearest binary floating-point value. Lossy for values
    /// with more significant digits than an `f64` mantissa holds.
    pub fn to_f64(&self) -> f64 {
        self.unscaled as f64 / 10f64.powi(self.scale as i32)
    }

    /// Returns the minimal big-endian two's-complement rendering of the
    /// unscaled value. Zero renders as an empty slice.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        unscaled_to_be_bytes(self.unscaled)
    }

    /// Reconstructs a decimal from a big-endian two's-complement unscaled
    /// value (at most 16 bytes; empty means zero) and a scale.
    pub fn from_be_bytes(bytes: &[u8], scale: u32) -> Result<Decimal> {
        if bytes.len() > 16 {
            return Err(Error::invalid_arg(
                "bytes",
                "unscaled value wider than 128 bits",
            ));
        }
        Ok(Decimal {
            unscaled: unscaled_from_be_bytes(bytes),
            scale,
        })
    }
}

/// Minimal big-endian two's-complement rendering of `value`; empty for zero.
pub fn unscaled_to_be_bytes(value: i128) -> Vec<u8> {
    if value == 0 {
        return Vec::new();
    }
    let all = value.to_be_bytes();
    let filler = if value < 0 { 0xFF } else { 0x00 };
    let mut start = 0;
    while start < all.len() - 1
        && all[start] == filler
        && (all[start + 1] & 0x80 == 0) != (value < 0)
    {
        start += 1;
    }
    all[start..].to_vec()
}

/// Sign-extends a big-endian two's-complement byte string into an `i128`.
/// Empty input is zero. The input must be at most 16 bytes.
pub fn unscaled_from_be_bytes(bytes: &[u8]) -> i128 {
    if bytes.is_empty() {
        return 0;
    }
    let mut acc: u128 = 0;
    for &b in bytes {
        acc = (acc << 8) | b as u128;
    }
    let shift = 128 - 8 * bytes.len() as u32;
    ((acc << shift) as i128) >> shift
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Decimal) -> bool {
        let (lo, hi) = if self.scale <= other.scale {
            (self, other)
        } else {
            (other, self)
        };
        // A value that overflows i128 when aligned cannot equal one that
        // did not.
        match pow10(hi.scale - lo.scale).and_then(|f| lo.unscaled.checked_mul(f)) {
            Some(aligned) => aligned == hi.unscaled,
            None => false,
        }
    }
}

impl Eq for Decimal {}

impl From<i64> for Decimal {
    fn from(value: i64) -> Decimal {
        Decimal::new(value as i128, 0)
    }
}

impl From<i32> for Decimal {
    fn from(value: i32) -> Decimal {
        Decimal::new(value as i128, 0)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.unscaled.unsigned_abs().to_string();
        let sign = if self.unscaled < 0 { "-" } else { "" };
        if self.scale == 0 {
            return write!(f, "{sign}{digits}");
        }
        let scale = self.scale as usize;
        if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(f, "{sign}{int_part}.{frac_part}")
        } else {
            write!(f, "{sign}0.{0:0>1$}", digits, scale)
        }
    }
}

impl FromStr for Decimal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Decimal> {
        let bad = || Error::invalid_arg("decimal", "not a plain decimal literal");
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(bad());
        }
        let mut unscaled: i128 = 0;
        for c in int_part.chars().chain(frac_part.chars()) {
            let digit = c.to_digit(10).ok_or_else(bad)? as i128;
            unscaled = unscaled
                .checked_mul(10)
                .and_then(|u| u.checked_add(digit))
                .ok_or_else(|| Error::invalid_arg("decimal", "more than 38 digits"))?;
        }
        if negative {
            unscaled = -unscaled;
        }
        Ok(Decimal::new(unscaled, frac_part.len() as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Decimal::new(0, 0).to_string(), "0");
        assert_eq!(Decimal::new(42, 0).to_string(), "42");
        assert_eq!(Decimal::new(-12345, 2).to_string(), "-123.45");
        assert_eq!(Decimal::new(5, 3).to_string(), "0.005");
        assert_eq!(Decimal::new(-5, 1).to_string(), "-0.5");
    }

    #[test]
    fn test_parse_round_trip() {
        for s in ["0", "42", "-123.45", "0.005", "-0.5", "99999999999999999999"] {
            let d: Decimal = s.parse().unwrap();
            assert_eq!(d.to_string(), s);
        }
        assert!("".parse::<Decimal>().is_err());
        assert!("abc".parse::<Decimal>().is_err());
        assert!("1.2.3".parse::<Decimal>().is_err());
    }

    #[test]
    fn test_value_equality_across_scales() {
        assert_eq!(Decimal::new(4200, 2), Decimal::new(42, 0));
        assert_eq!(Decimal::new(0, 5), Decimal::ZERO);
        assert_ne!(Decimal::new(4201, 2), Decimal::new(42, 0));
    }

    #[test]
    fn test_rescale() {
        let d = Decimal::new(-12345, 2);
        assert_eq!(d.rescale(4).unwrap().unscaled(), -1234500);
        assert_eq!(Decimal::new(-1234500, 4).rescale(2).unwrap().unscaled(), -12345);
        assert!(d.rescale(1).is_err());
    }

    #[test]
    fn test_from_f64_scaled() {
        assert_eq!(Decimal::from_f64_scaled(-123.45, 2).unwrap(), Decimal::new(-12345, 2));
        assert_eq!(Decimal::from_f64_scaled(0.5, 0).unwrap(), Decimal::new(1, 0));
        assert_eq!(Decimal::from_f64_scaled(-0.5, 0).unwrap(), Decimal::new(-1, 0));
        assert!(Decimal::from_f64_scaled(f64::NAN, 0).is_err());
        assert!(Decimal::from_f64_scaled(f64::INFINITY, 2).is_err());
    }

    #[test]
    fn test_to_i64() {
        assert_eq!(Decimal::new(4200, 2).to_i64().unwrap(), 42);
        assert!(Decimal::new(4250, 2).to_i64().is_err());
        assert!(Decimal::new(i128::MAX, 0).to_i64().is_err());
    }

    #[test]
    fn test_be_bytes_minimal() {
        assert_eq!(unscaled_to_be_bytes(0), Vec::<u8>::new());
        assert_eq!(unscaled_to_be_bytes(1), vec![0x01]);
        assert_eq!(unscaled_to_be_bytes(-1), vec![0xFF]);
        assert_eq!(unscaled_to_be_bytes(127), vec![0x7F]);
        assert_eq!(unscaled_to_be_bytes(128), vec![0x00, 0x80]);
        assert_eq!(unscaled_to_be_bytes(-128), vec![0x80]);
        assert_eq!(unscaled_to_be_bytes(-129), vec![0xFF, 0x7F]);
    }

    #[test]
    fn test_be_bytes_round_trip() {
        for v in [
            0i128,
            1,
            -1,
            255,
            -255,
            i128::from(i64::MAX),
            i128::from(i64::MIN),
            i128::MAX,
            i128::MIN,
        ] {
            let bytes = unscaled_to_be_bytes(v);
            assert_eq!(unscaled_from_be_bytes(&bytes), v, "value {v}");
        }
        let mut rng_values = Vec::new();
        for _ in 0..1000 {
            rng_values.push(fastrand::i128(..));
        }
        for v in rng_values {
            assert_eq!(unscaled_from_be_bytes(&unscaled_to_be_bytes(v)), v);
        }
    }
}
