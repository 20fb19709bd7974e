//! Packed date/time values.
//!
//! The station stores timestamps as five bytes `YY MM DD hh mm` where every
//! byte holds two BCD digits. Rendering each byte as two hex digits yields
//! the decimal calendar value, so the value is formatted rather than
//! converted: `[0x10, 0x02, 0x14, 0x21, 0x35]` renders as
//! `2010-02-14 21:35`.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

use crate::error::{FormatError, FormatResult};

/// Width of a packed date in device memory
pub const PACKED_DATE_SIZE: usize = 5;

/// Format used for rendered dates and for parsing user-supplied dates
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Five-byte packed timestamp as stored by the station
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackedDate(pub [u8; PACKED_DATE_SIZE]);

impl PackedDate {
    /// Parse from the first five bytes of `data`
    pub fn from_bytes(data: &[u8]) -> FormatResult<Self> {
        let bytes: [u8; PACKED_DATE_SIZE] = data
            .get(..PACKED_DATE_SIZE)
            .and_then(|slice| slice.try_into().ok())
            .ok_or(FormatError::ShortInput {
                expected: PACKED_DATE_SIZE,
                actual: data.len(),
            })?;
        Ok(Self(bytes))
    }

    /// Raw bytes
    pub const fn as_bytes(&self) -> &[u8; PACKED_DATE_SIZE] {
        &self.0
    }

    /// Interpret the rendered value as a calendar timestamp
    pub fn to_datetime(&self) -> FormatResult<NaiveDateTime> {
        let rendered = self.to_string();
        NaiveDateTime::parse_from_str(&rendered, DATE_FORMAT)
            .map_err(|_| FormatError::InvalidDate { rendered })
    }
}

impl fmt::Display for PackedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [yy, mo, dd, hh, mi] = self.0;
        write!(f, "20{yy:02x}-{mo:02x}-{dd:02x} {hh:02x}:{mi:02x}")
    }
}

impl Serialize for PackedDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse a user-supplied `YYYY-MM-DD HH:MM` timestamp
pub fn parse_timestamp(text: &str) -> FormatResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), DATE_FORMAT).map_err(|_| FormatError::InvalidDate {
        rendered: text.to_string(),
    })
}

/// Render a timestamp the way the station renders its own dates
pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(DATE_FORMAT).to_string()
}
