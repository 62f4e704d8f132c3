//! Encoded-variable codec
//!
//! Converts fixed-width encoded integer and float tokens back to text.
//!
//! # Float Layout
//!
//! ```text
//! four-byte:  [sign:1][digits:25][num_digits-1:3][decimal_pos-1:3]
//! eight-byte: [sign:1][reserved:1][digits:54][num_digits-1:4][decimal_pos-1:4]
//! ```
//!
//! `decimal_pos` counts digits to the right of the decimal point.

use std::fmt;

use crate::{IrError, Result};

const FOUR_BYTE_DIGITS_MASK: u32 = (1 << 25) - 1;
const EIGHT_BYTE_DIGITS_MASK: u64 = (1 << 54) - 1;

/// Width of encoded variables, fixed per stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingWidth {
    FourByte,
    EightByte,
}

impl EncodingWidth {
    /// Size of one encoded variable in bytes
    #[inline]
    pub const fn size(self) -> usize {
        match self {
            Self::FourByte => 4,
            Self::EightByte => 8,
        }
    }

    /// Get string representation
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FourByte => "four-byte",
            Self::EightByte => "eight-byte",
        }
    }
}

impl fmt::Display for EncodingWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fixed-width encoded variable token
pub trait EncodedVariable: Copy + fmt::Debug {
    /// Render as an integer
    fn decode_integer(self) -> String;

    /// Render as a float
    fn decode_float(self) -> Result<String>;
}

impl EncodedVariable for i32 {
    fn decode_integer(self) -> String {
        self.to_string()
    }

    fn decode_float(self) -> Result<String> {
        let bits = self as u32;
        format_float(FloatParts {
            negative: bits >> 31 != 0,
            digits: u64::from((bits >> 6) & FOUR_BYTE_DIGITS_MASK),
            num_digits: ((bits >> 3) & 0x07) as usize + 1,
            decimal_pos: (bits & 0x07) as usize + 1,
        })
    }
}

impl EncodedVariable for i64 {
    fn decode_integer(self) -> String {
        self.to_string()
    }

    fn decode_float(self) -> Result<String> {
        let bits = self as u64;
        format_float(FloatParts {
            negative: bits >> 63 != 0,
            digits: (bits >> 8) & EIGHT_BYTE_DIGITS_MASK,
            num_digits: ((bits >> 4) & 0x0F) as usize + 1,
            decimal_pos: (bits & 0x0F) as usize + 1,
        })
    }
}

struct FloatParts {
    negative: bool,
    digits: u64,
    num_digits: usize,
    decimal_pos: usize,
}

fn format_float(parts: FloatParts) -> Result<String> {
    if parts.decimal_pos > parts.num_digits {
        return Err(IrError::message_decoding(format!(
            "encoded float has decimal position {} beyond its {} digits",
            parts.decimal_pos, parts.num_digits
        )));
    }

    let digits = parts.digits.to_string();
    if digits.len() > parts.num_digits {
        return Err(IrError::message_decoding(format!(
            "encoded float digits {} are longer than its digit count {}",
            digits, parts.num_digits
        )));
    }

    let padded = format!("{:0>width$}", digits, width = parts.num_digits);
    let split = parts.num_digits - parts.decimal_pos;

    let mut out = String::with_capacity(parts.num_digits + 2);
    if parts.negative {
        out.push('-');
    }
    out.push_str(&padded[..split]);
    out.push('.');
    out.push_str(&padded[split..]);
    Ok(out)
}
