//! Tag byte layout: type family in the high nibble, variant in the low.

/// Null value. No content bytes.
pub const NULL: u8 = 0x0;

/// The family's literal zero: false, numeric zero, empty string/array,
/// ordinal 0, or the present marker for the object family. No content bytes.
pub const ZERO: u8 = 0x1;

/// First width-bearing variant: variant `PRESENT + k` carries `k + 1`
/// content bytes. For strings, big integers, big decimals and byte arrays
/// this exact variant marks a non-empty value whose compacted length
/// follows.
pub const PRESENT: u8 = 0x2;

/// True, for the boolean family.
pub const TRUE: u8 = 0x2;

/// Type family, the tag byte's high nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Family {
    Boolean = 0x0,
    Byte = 0x1,
    Short = 0x2,
    Char = 0x3,
    Int = 0x4,
    Long = 0x5,
    Float = 0x6,
    Double = 0x7,
    String = 0x8,
    Date = 0x9,
    BigInteger = 0xA,
    BigDecimal = 0xB,
    ByteArray = 0xC,
    Enum = 0xD,
    Object = 0xE,
}

impl Family {
    pub fn from_high_nibble(nibble: u8) -> Option<Family> {
        match nibble {
            0x0 => Some(Family::Boolean),
            0x1 => Some(Family::Byte),
            0x2 => Some(Family::Short),
            0x3 => Some(Family::Char),
            0x4 => Some(Family::Int),
            0x5 => Some(Family::Long),
            0x6 => Some(Family::Float),
            0x7 => Some(Family::Double),
            0x8 => Some(Family::String),
            0x9 => Some(Family::Date),
            0xA => Some(Family::BigInteger),
            0xB => Some(Family::BigDecimal),
            0xC => Some(Family::ByteArray),
            0xD => Some(Family::Enum),
            0xE => Some(Family::Object),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Family::Boolean => "boolean",
            Family::Byte => "byte",
            Family::Short => "short",
            Family::Char => "char",
            Family::Int => "int",
            Family::Long => "long",
            Family::Float => "float",
            Family::Double => "double",
            Family::String => "string",
            Family::Date => "date",
            Family::BigInteger => "big-integer",
            Family::BigDecimal => "big-decimal",
            Family::ByteArray => "byte-array",
            Family::Enum => "enum",
            Family::Object => "object",
        }
    }
}

#[inline]
pub fn compose(family: Family, variant: u8) -> u8 {
    ((family as u8) << 4) | variant
}
