//! Output formatting for records, headers and memory dumps.

use std::fmt::Write as _;

use chrono::NaiveDateTime;
use serde::Serialize;
use wsreader_formats::{Address, FieldDescriptor, Notation, Scalar, WeatherRecord, format_timestamp};

use crate::print_spec::{FieldCode, PrintSpec};

/// Bytes per hex dump row
pub const DUMP_WIDTH: usize = 16;

/// How records are laid out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportStyle {
    /// Fields joined by a separator
    Compact {
        /// Text between fields
        separator: String,
    },
    /// Right-aligned fixed-width columns with a heading row
    Columns {
        /// Text between columns
        separator: String,
    },
    /// One JSON object per record
    Json,
}

/// A record ready for printing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordRow {
    /// Logical index
    pub index: u32,
    /// Derived timestamp, when requested
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_timestamp"
    )]
    pub timestamp: Option<NaiveDateTime>,
    /// Rain since the previous record, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rain_delta: Option<f64>,
    /// Decoded record
    #[serde(flatten)]
    pub record: WeatherRecord,
}

#[allow(clippy::ref_option)]
fn serialize_timestamp<S: serde::Serializer>(
    timestamp: &Option<NaiveDateTime>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match timestamp {
        Some(timestamp) => serializer.collect_str(&format_timestamp(timestamp)),
        None => serializer.serialize_none(),
    }
}

impl RecordRow {
    /// Compact rendering of one field
    pub fn field(&self, code: FieldCode) -> String {
        let record = &self.record;
        let timestamp = || {
            self.timestamp
                .as_ref()
                .map_or_else(|| "-".to_string(), format_timestamp)
        };
        match code {
            FieldCode::Address => format!("{:04x}", record.address),
            FieldCode::HumidityOut => record.humidity_out.to_string(),
            FieldCode::HumidityIn => record.humidity_in.to_string(),
            FieldCode::TemperatureOut => format!("{:.1}", record.temperature_out),
            FieldCode::TemperatureIn => format!("{:.1}", record.temperature_in),
            FieldCode::Rain => format!("{:.1}", record.rain_counter),
            FieldCode::RainDelta => self
                .rain_delta
                .map_or_else(|| "-".to_string(), |delta| format!("{delta:.1}")),
            FieldCode::Pressure => format!("{:.1}", record.pressure),
            FieldCode::WindSpeed => format!("{:.1}", record.wind_speed),
            FieldCode::GustSpeed => format!("{:.1}", record.gust_speed),
            FieldCode::WindDirectionName => {
                format!("'{}'", record.wind_direction_name().unwrap_or("?"))
            }
            FieldCode::WindDirection => record.wind_direction.to_string(),
            FieldCode::Interval => record.interval.to_string(),
            FieldCode::Timestamp => timestamp(),
            FieldCode::QuotedTimestamp => format!("'{}'", timestamp()),
            FieldCode::ErrorCode => format!("{:02x}", record.error_code),
        }
    }
}

/// Writes records in one style, emitting headings once
#[derive(Debug)]
pub struct RecordReport {
    style: ReportStyle,
    spec: PrintSpec,
    headings_pending: bool,
}

impl RecordReport {
    /// New report for `spec` in `style`
    pub const fn new(style: ReportStyle, spec: PrintSpec) -> Self {
        Self {
            style,
            spec,
            headings_pending: true,
        }
    }

    /// Lines for one record; the first record in column style also gets
    /// the heading row
    pub fn render(&mut self, row: &RecordRow) -> serde_json::Result<Vec<String>> {
        let mut lines = Vec::with_capacity(2);
        match &self.style {
            ReportStyle::Compact { separator } => {
                lines.push(join(self.spec.codes().iter().map(|&code| row.field(code)), separator));
            }
            ReportStyle::Columns { separator } => {
                if self.headings_pending {
                    lines.push(join(
                        self.spec
                            .codes()
                            .iter()
                            .map(|&code| format!("{:>width$}", code.heading(), width = code.width())),
                        separator,
                    ));
                }
                lines.push(join(
                    self.spec
                        .codes()
                        .iter()
                        .map(|&code| format!("{:>width$}", row.field(code), width = code.width())),
                    separator,
                ));
            }
            ReportStyle::Json => lines.push(serde_json::to_string(row)?),
        }
        self.headings_pending = false;
        Ok(lines)
    }
}

fn join(fields: impl Iterator<Item = String>, separator: &str) -> String {
    fields.collect::<Vec<_>>().join(separator)
}

/// Hex dump rows of `bytes` read from `start`, `width` bytes per row
///
/// Rows break on multiples of `width` so addresses line up.
pub fn hex_dump(start: Address, bytes: &[u8], width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for (offset, byte) in bytes.iter().enumerate() {
        let address = start as usize + offset;
        if offset == 0 || address % width == 0 {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            let _ = write!(line, "{address:04x} |");
        }
        let _ = write!(line, " {byte:02x}");
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// One raw record as `addr | bytes`
pub fn raw_line(record: &WeatherRecord) -> String {
    let mut line = format!("{:04x} |", record.address);
    for byte in record.raw {
        let _ = write!(line, " {byte:02x}");
    }
    line
}

/// Header field value in its preferred notation
pub fn header_value(field: &FieldDescriptor, value: &Scalar) -> String {
    match (field.notation, value.as_u32()) {
        (Notation::Hex, Some(number)) => format!("{number:04x}"),
        _ => value.to_string(),
    }
}

/// One header listing line
pub fn header_line(field: &FieldDescriptor, value: &Scalar) -> String {
    format!("{:<32} {}", field.description, header_value(field, value))
}
