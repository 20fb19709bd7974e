//! Scalar decoders for station memory.
//!
//! All multi-byte values are little-endian. Signed 16-bit values use a
//! sign-magnitude encoding: bit 15 is a sign flag and the remaining bits hold
//! the magnitude. It is not two's complement.

use std::fmt;

use serde::Serialize;

use crate::date::{PACKED_DATE_SIZE, PackedDate};
use crate::error::{FormatError, FormatResult};

/// Storage type of a header field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScalarKind {
    /// Single unsigned byte
    Char,
    /// Sign-magnitude 16-bit integer
    Int16,
    /// Unsigned 16-bit integer
    UInt16,
    /// Unsigned 24-bit integer
    UInt24,
    /// Five-byte packed date
    Date,
}

impl ScalarKind {
    /// Number of bytes occupied in device memory
    pub const fn width(self) -> usize {
        match self {
            Self::Char => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::UInt24 => 3,
            Self::Date => PACKED_DATE_SIZE,
        }
    }

    /// Decode a value of this kind from the start of `data`
    pub fn decode(self, data: &[u8]) -> FormatResult<Scalar> {
        let width = self.width();
        if data.len() < width {
            return Err(FormatError::ShortInput {
                expected: width,
                actual: data.len(),
            });
        }

        let value = match self {
            Self::Char => Scalar::Char(data[0]),
            Self::Int16 => Scalar::Int(sign_magnitude_i16([data[0], data[1]])),
            Self::UInt16 => Scalar::UInt(u32::from(u16_le([data[0], data[1]]))),
            Self::UInt24 => Scalar::UInt(u24_le([data[0], data[1], data[2]])),
            Self::Date => Scalar::Date(PackedDate::from_bytes(data)?),
        };
        Ok(value)
    }
}

/// A decoded header value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Raw byte
    Char(u8),
    /// Signed integer
    Int(i32),
    /// Unsigned integer
    UInt(u32),
    /// Packed timestamp
    Date(PackedDate),
}

impl Scalar {
    /// Numeric value as an unsigned integer, if it has one that fits
    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            Self::Char(v) => Some(u32::from(v)),
            Self::UInt(v) => Some(v),
            Self::Int(v) => u32::try_from(v).ok(),
            Self::Date(_) => None,
        }
    }

    /// The packed date, if this is one
    pub const fn as_date(&self) -> Option<&PackedDate> {
        match self {
            Self::Date(date) => Some(date),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Date(date) => write!(f, "{date}"),
        }
    }
}

/// Little-endian unsigned 16-bit value
#[inline]
pub const fn u16_le(bytes: [u8; 2]) -> u16 {
    u16::from_le_bytes(bytes)
}

/// Little-endian sign-magnitude 16-bit value
#[inline]
pub const fn sign_magnitude_i16(bytes: [u8; 2]) -> i32 {
    let value = u16::from_le_bytes(bytes);
    if value & 0x8000 != 0 {
        -((value ^ 0x8000) as i32)
    } else {
        value as i32
    }
}

/// Little-endian unsigned 24-bit value
#[inline]
pub const fn u24_le(bytes: [u8; 3]) -> u32 {
    bytes[0] as u32 + (bytes[1] as u32) * 256 + (bytes[2] as u32) * 65536
}

/// Scale a raw tenths value to its physical unit
#[inline]
pub fn tenths<T: Into<f64>>(raw: T) -> f64 {
    raw.into() / 10.0
}
