//! Record print specifications.
//!
//! A print specification is a string of single-letter field codes, printed
//! in the order given. `ahHtTrpwg` is the default.

use std::fmt;
use std::str::FromStr;

use crate::error::CliError;

/// Print specification used when none is given
pub const DEFAULT_PRINT_SPEC: &str = "ahHtTrpwg";

/// One printable record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldCode {
    /// `a`: record address in hex
    Address,
    /// `h`: outdoor humidity
    HumidityOut,
    /// `H`: indoor humidity
    HumidityIn,
    /// `t`: outdoor temperature
    TemperatureOut,
    /// `T`: indoor temperature
    TemperatureIn,
    /// `r`: rain counter
    Rain,
    /// `R`: rain since the previous record
    RainDelta,
    /// `p`: pressure
    Pressure,
    /// `w`: wind speed
    WindSpeed,
    /// `g`: gust speed
    GustSpeed,
    /// `d`: quoted compass name of the wind direction
    WindDirectionName,
    /// `D`: wind direction index
    WindDirection,
    /// `i`: record interval
    Interval,
    /// `u`: timestamp
    Timestamp,
    /// `U`: quoted timestamp
    QuotedTimestamp,
    /// `e`: error code in hex
    ErrorCode,
}

impl FieldCode {
    /// Every code, in documentation order
    pub const ALL: [Self; 16] = [
        Self::Address,
        Self::HumidityOut,
        Self::HumidityIn,
        Self::TemperatureOut,
        Self::TemperatureIn,
        Self::Rain,
        Self::RainDelta,
        Self::Pressure,
        Self::WindSpeed,
        Self::GustSpeed,
        Self::WindDirectionName,
        Self::WindDirection,
        Self::Interval,
        Self::Timestamp,
        Self::QuotedTimestamp,
        Self::ErrorCode,
    ];

    /// Field for a specification letter
    pub const fn from_letter(letter: char) -> Option<Self> {
        let code = match letter {
            'a' => Self::Address,
            'h' => Self::HumidityOut,
            'H' => Self::HumidityIn,
            't' => Self::TemperatureOut,
            'T' => Self::TemperatureIn,
            'r' => Self::Rain,
            'R' => Self::RainDelta,
            'p' => Self::Pressure,
            'w' => Self::WindSpeed,
            'g' => Self::GustSpeed,
            'd' => Self::WindDirectionName,
            'D' => Self::WindDirection,
            'i' => Self::Interval,
            'u' => Self::Timestamp,
            'U' => Self::QuotedTimestamp,
            'e' => Self::ErrorCode,
            _ => return None,
        };
        Some(code)
    }

    /// Specification letter of this field
    pub const fn letter(self) -> char {
        match self {
            Self::Address => 'a',
            Self::HumidityOut => 'h',
            Self::HumidityIn => 'H',
            Self::TemperatureOut => 't',
            Self::TemperatureIn => 'T',
            Self::Rain => 'r',
            Self::RainDelta => 'R',
            Self::Pressure => 'p',
            Self::WindSpeed => 'w',
            Self::GustSpeed => 'g',
            Self::WindDirectionName => 'd',
            Self::WindDirection => 'D',
            Self::Interval => 'i',
            Self::Timestamp => 'u',
            Self::QuotedTimestamp => 'U',
            Self::ErrorCode => 'e',
        }
    }

    /// Column heading
    pub const fn heading(self) -> &'static str {
        match self {
            Self::Address => "loc.",
            Self::HumidityOut => "hO.",
            Self::HumidityIn => "hI.",
            Self::TemperatureOut => "oTemp",
            Self::TemperatureIn => "iTemp",
            Self::Rain => "rn.",
            Self::RainDelta => "rdif",
            Self::Pressure => "Pres..",
            Self::WindSpeed => "wSpd.",
            Self::GustSpeed => "gSpd.",
            Self::WindDirectionName | Self::WindDirection => "dir",
            Self::Interval => "int",
            Self::Timestamp | Self::QuotedTimestamp => "date",
            Self::ErrorCode => "err",
        }
    }

    /// Column width in headings mode
    pub const fn width(self) -> usize {
        match self {
            Self::Address | Self::HumidityOut | Self::HumidityIn => 4,
            Self::TemperatureOut
            | Self::TemperatureIn
            | Self::Rain
            | Self::RainDelta
            | Self::WindSpeed
            | Self::GustSpeed
            | Self::WindDirectionName => 5,
            Self::Pressure => 6,
            Self::WindDirection | Self::Interval | Self::ErrorCode => 3,
            Self::Timestamp => 16,
            Self::QuotedTimestamp => 18,
        }
    }
}

/// An ordered list of fields to print
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintSpec {
    codes: Vec<FieldCode>,
}

impl PrintSpec {
    /// Fields in print order
    pub fn codes(&self) -> &[FieldCode] {
        &self.codes
    }

    /// Whether `code` is printed
    pub fn contains(&self, code: FieldCode) -> bool {
        self.codes.contains(&code)
    }

    /// Whether record timestamps have to be computed
    pub fn needs_timestamp(&self) -> bool {
        self.contains(FieldCode::Timestamp) || self.contains(FieldCode::QuotedTimestamp)
    }

    /// Whether the previous record has to be read for a rain delta
    pub fn needs_rain_delta(&self) -> bool {
        self.contains(FieldCode::RainDelta)
    }
}

impl Default for PrintSpec {
    fn default() -> Self {
        Self {
            codes: DEFAULT_PRINT_SPEC
                .chars()
                .filter_map(FieldCode::from_letter)
                .collect(),
        }
    }
}

impl FromStr for PrintSpec {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(CliError::EmptyPrintSpec);
        }
        let codes = s
            .chars()
            .map(|letter| FieldCode::from_letter(letter).ok_or(CliError::UnknownPrintCode(letter)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { codes })
    }
}

impl fmt::Display for PrintSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.codes
            .iter()
            .try_for_each(|code| write!(f, "{}", code.letter()))
    }
}
