//! Weather record layout.
//!
//! Each record in the ring is 16 bytes:
//!
//! | Offset | Size | Field | Encoding |
//! |--------|------|-------|----------|
//! | 0x00   | 1    | Interval (minutes) | raw |
//! | 0x01   | 1    | Indoor humidity (%) | raw |
//! | 0x02   | 2    | Indoor temperature | sign-magnitude, tenths °C |
//! | 0x04   | 1    | Outdoor humidity (%) | raw |
//! | 0x05   | 2    | Outdoor temperature | sign-magnitude, tenths °C |
//! | 0x07   | 2    | Pressure | unsigned, tenths hPa |
//! | 0x09   | 1    | Wind speed | raw, tenths m/s |
//! | 0x0A   | 2    | Gust speed | unsigned, tenths m/s |
//! | 0x0C   | 1    | Wind direction | index 0-15 |
//! | 0x0D   | 2    | Rain counter | unsigned, tenths |
//! | 0x0F   | 1    | Error code | raw |

use std::io::Cursor;

use binrw::{BinRead, BinWrite};
use serde::Serialize;

use crate::compass::compass_point;
use crate::error::{FormatError, FormatResult};
use crate::layout::Address;
use crate::scalar::{sign_magnitude_i16, tenths};

/// Size of one record in bytes
pub const RECORD_SIZE: usize = 16;

/// Sign-magnitude 16-bit field
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct SignMagnitude16(pub u16);

impl SignMagnitude16 {
    /// Encode a signed value, saturating the magnitude at 15 bits
    pub fn from_value(value: i32) -> Self {
        let magnitude = value.unsigned_abs().min(0x7FFF) as u16;
        if value < 0 {
            Self(magnitude | 0x8000)
        } else {
            Self(magnitude)
        }
    }

    /// Decoded signed value
    pub const fn value(self) -> i32 {
        sign_magnitude_i16(self.0.to_le_bytes())
    }
}

/// Undecoded record fields, exactly as stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct RawRecord {
    /// Minutes covered by this record
    pub interval: u8,
    /// Indoor relative humidity
    pub humidity_in: u8,
    /// Indoor temperature, tenths of a degree
    pub temperature_in: SignMagnitude16,
    /// Outdoor relative humidity
    pub humidity_out: u8,
    /// Outdoor temperature, tenths of a degree
    pub temperature_out: SignMagnitude16,
    /// Absolute pressure, tenths of a hPa
    pub pressure: u16,
    /// Average wind speed, tenths of m/s
    pub wind_speed: u8,
    /// Gust speed, tenths of m/s
    pub gust_speed: u16,
    /// Compass index of the wind direction
    pub wind_direction: u8,
    /// Cumulative rain counter
    pub rain_counter: u16,
    /// Sensor status flags
    pub error_code: u8,
}

impl RawRecord {
    /// Parse from the first 16 bytes of `data`
    pub fn parse(data: &[u8]) -> FormatResult<Self> {
        if data.len() < RECORD_SIZE {
            return Err(FormatError::ShortInput {
                expected: RECORD_SIZE,
                actual: data.len(),
            });
        }
        let mut cursor = Cursor::new(&data[..RECORD_SIZE]);
        Ok(Self::read(&mut cursor)?)
    }

    /// Serialize back to the on-device layout
    pub fn to_bytes(&self) -> FormatResult<[u8; RECORD_SIZE]> {
        let mut cursor = Cursor::new([0u8; RECORD_SIZE]);
        self.write(&mut cursor)?;
        Ok(cursor.into_inner())
    }
}

/// A decoded weather record and where it was read from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherRecord {
    /// Physical address of the record
    pub address: Address,
    /// Minutes covered by this record
    pub interval: u8,
    /// Indoor relative humidity (%)
    pub humidity_in: u8,
    /// Indoor temperature (°C)
    pub temperature_in: f64,
    /// Outdoor relative humidity (%)
    pub humidity_out: u8,
    /// Outdoor temperature (°C)
    pub temperature_out: f64,
    /// Absolute pressure (hPa)
    pub pressure: f64,
    /// Average wind speed (m/s)
    pub wind_speed: f64,
    /// Gust speed (m/s)
    pub gust_speed: f64,
    /// Compass index of the wind direction
    pub wind_direction: u8,
    /// Cumulative rain counter
    pub rain_counter: f64,
    /// Sensor status flags
    pub error_code: u8,
    /// The undecoded bytes
    #[serde(skip)]
    pub raw: [u8; RECORD_SIZE],
}

impl WeatherRecord {
    /// Decode the 16 bytes read from `address`
    pub fn decode(address: Address, data: &[u8]) -> FormatResult<Self> {
        let fields = RawRecord::parse(data)?;
        let mut raw = [0u8; RECORD_SIZE];
        raw.copy_from_slice(&data[..RECORD_SIZE]);
        Ok(Self::from_raw(address, &fields, raw))
    }

    /// Build from already-parsed fields
    pub fn from_raw(address: Address, fields: &RawRecord, raw: [u8; RECORD_SIZE]) -> Self {
        Self {
            address,
            interval: fields.interval,
            humidity_in: fields.humidity_in,
            temperature_in: tenths(fields.temperature_in.value()),
            humidity_out: fields.humidity_out,
            temperature_out: tenths(fields.temperature_out.value()),
            pressure: tenths(fields.pressure),
            wind_speed: tenths(fields.wind_speed),
            gust_speed: tenths(fields.gust_speed),
            wind_direction: fields.wind_direction,
            rain_counter: tenths(fields.rain_counter),
            error_code: fields.error_code,
            raw,
        }
    }

    /// Compass name of the wind direction
    pub fn wind_direction_name(&self) -> Option<&'static str> {
        compass_point(self.wind_direction)
    }

    /// Raw bytes as a lowercase hex string
    pub fn raw_hex(&self) -> String {
        hex::encode(self.raw)
    }
}
