//! Exact fixed-point decimal value type used by the hostrec codecs.
//!
//! The wire formats top out at 31 decimal digits, well within the 38 digits
//! an `i128` unscaled value can hold, so no arbitrary-precision arithmetic
//! is needed on the codec side.

pub mod decimal;

pub use decimal::{Decimal, MAX_DIGITS};
