//! Command-line configuration.
//!
//! Options can be given as flags or through environment variables
//! (`WSREADER_FILE`, `WSREADER_DEVICE`, `WSREADER_PRINT_SPEC`,
//! `WSREADER_SEPARATOR`).
//!
//! # Example
//!
//! ```
//! use clap::Parser;
//! use wsreader_cli::{Cli, Command};
//!
//! let cli = Cli::try_parse_from(["wsreader", "--file", "station.bin", "records", "0:9"])?;
//! assert!(matches!(cli.command, Command::Records { .. }));
//! # Ok::<(), clap::Error>(())
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDateTime;
use clap::{ArgAction, Parser, Subcommand};
use wsreader_formats::{Address, parse_timestamp};
use wsreader_store::hidraw::locate_station;
use wsreader_store::{StoreConfig, StoreTarget};

use crate::error::CliError;
use crate::print_spec::{DEFAULT_PRINT_SPEC, PrintSpec};
use crate::report::ReportStyle;

/// Reader configuration loaded from CLI args and environment variables
#[derive(Debug, Clone, Parser)]
#[command(
    name = "wsreader",
    about = "Read and report data from Fine Offset WH1080 weather stations",
    version
)]
pub struct Cli {
    /// Read a memory snapshot instead of the station (`:usb:` selects the station)
    #[arg(short = 'F', long, env = "WSREADER_FILE", global = true)]
    pub file: Option<String>,

    /// hidraw node of the station [default: the node whose USB id matches
    /// the station, else /dev/hidraw0]
    #[arg(long, env = "WSREADER_DEVICE", global = true)]
    pub device: Option<PathBuf>,

    /// Record fields to print, e.g. `ahHtTrpwg`
    #[arg(
        short = 'p',
        long = "print",
        env = "WSREADER_PRINT_SPEC",
        default_value = DEFAULT_PRINT_SPEC,
        global = true
    )]
    pub print_spec: PrintSpec,

    /// Separator between printed fields
    #[arg(
        short = 'S',
        long,
        env = "WSREADER_SEPARATOR",
        default_value = ", ",
        global = true
    )]
    pub separator: String,

    /// Fixed-width columns with a heading row
    #[arg(long, global = true, conflicts_with = "json")]
    pub headings: bool,

    /// One JSON object per line
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// What to read
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List every header field
    Header,

    /// Hex dump of station memory, e.g. `0x100:0x200`
    Dump {
        /// Hex address range, end exclusive
        range: Option<MemoryRange>,
    },

    /// Save station memory to a file
    Copy {
        /// Snapshot file to write
        output: PathBuf,

        /// Copy the whole address space instead of stopping at the current record
        #[arg(long)]
        full: bool,
    },

    /// List records by index, 0 being the record in progress
    Records {
        /// `start`, `:end`, `start:end` or `start:n` (through the oldest)
        range: Option<RecordRange>,

        /// List through the oldest stored record
        #[arg(long)]
        all: bool,
    },

    /// List saved records taken after a date
    Since {
        /// `YYYY-MM-DD HH:MM`
        #[arg(value_parser = parse_date)]
        date: NaiveDateTime,
    },

    /// Hex dump of raw records
    Raw {
        /// Same forms as for `records`
        range: Option<RecordRange>,
    },
}

impl Cli {
    /// Parse configuration from command-line arguments
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Store configuration for the selected device node
    ///
    /// Without `--device` the station is looked up by its USB id.
    pub fn store_config(&self) -> StoreConfig {
        let device = self.device.clone().unwrap_or_else(locate_station);
        StoreConfig::new().with_device_path(device)
    }

    /// Store to open
    pub fn target(&self) -> StoreTarget {
        let config = self.store_config();
        match &self.file {
            Some(identifier) => config.target(identifier),
            None => StoreTarget::Device(config.device_path),
        }
    }

    /// Output style from `--json`, `--headings` and `--separator`
    pub fn report_style(&self) -> ReportStyle {
        if self.json {
            ReportStyle::Json
        } else if self.headings {
            ReportStyle::Columns {
                separator: self.separator.clone(),
            }
        } else {
            ReportStyle::Compact {
                separator: self.separator.clone(),
            }
        }
    }

    /// Default log filter for the verbosity count
    pub const fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

fn parse_date(text: &str) -> Result<NaiveDateTime, String> {
    parse_timestamp(text).map_err(|err| err.to_string())
}

/// End of a record range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEnd {
    /// Up to and including this index
    Index(u32),
    /// Through the oldest stored record
    Oldest,
}

/// A range of logical record indices as given on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordRange {
    /// First index
    pub start: u32,
    /// Last index
    pub end: RangeEnd,
}

impl Default for RecordRange {
    fn default() -> Self {
        Self {
            start: 0,
            end: RangeEnd::Index(0),
        }
    }
}

impl RecordRange {
    /// Every stored record
    pub const ALL: Self = Self {
        start: 0,
        end: RangeEnd::Oldest,
    };

    /// Concrete indices given how many records are stored
    ///
    /// An end below the start collapses to the start.
    pub fn resolve(self, stored: u32) -> Result<std::ops::RangeInclusive<u32>, CliError> {
        let last = stored.checked_sub(1).ok_or(CliError::NoRecords)?;
        let end = match self.end {
            RangeEnd::Index(end) => end.max(self.start),
            RangeEnd::Oldest => last.max(self.start),
        };
        if end > last {
            return Err(CliError::EndBeyondStored { end, stored });
        }
        Ok(self.start..=end)
    }
}

impl FromStr for RecordRange {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CliError::InvalidRecordRange(s.to_string());
        let index = |text: &str| text.trim().parse::<u32>().map_err(|_| invalid());

        let Some((start, end)) = s.split_once(':') else {
            let start = index(s)?;
            return Ok(Self {
                start,
                end: RangeEnd::Index(start),
            });
        };
        let start = if start.is_empty() { 0 } else { index(start)? };
        let end = match end.trim() {
            "n" => RangeEnd::Oldest,
            end => RangeEnd::Index(index(end)?),
        };
        Ok(Self { start, end })
    }
}

/// A range of memory addresses, end exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRange {
    /// First address
    pub start: Address,
    /// One past the last address
    pub end: Address,
}

impl MemoryRange {
    /// Upper bound of the station address space
    pub const LIMIT: Address = 0x1_0000;

    /// Number of bytes covered
    pub const fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    /// Whether the range is empty
    pub const fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

impl Default for MemoryRange {
    fn default() -> Self {
        Self {
            start: 0,
            end: Self::LIMIT,
        }
    }
}

impl FromStr for MemoryRange {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CliError::InvalidMemoryRange(s.to_string());
        let address = |text: &str| {
            let text = text.trim();
            let digits = text
                .strip_prefix("0x")
                .or_else(|| text.strip_prefix("0X"))
                .unwrap_or(text);
            Address::from_str_radix(digits, 16).map_err(|_| invalid())
        };

        let (start, end) = match s.split_once(':') {
            None => (address(s)?, Self::LIMIT),
            Some(("", end)) => (0, address(end)?),
            Some((start, end)) => (address(start)?, address(end)?),
        };
        if start > end || end == 0 || end > Self::LIMIT {
            return Err(invalid());
        }
        Ok(Self { start, end })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::expect_used)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_record_range_forms() {
        assert_eq!(
            "7".parse::<RecordRange>().unwrap(),
            RecordRange {
                start: 7,
                end: RangeEnd::Index(7)
            }
        );
        assert_eq!(
            ":12".parse::<RecordRange>().unwrap(),
            RecordRange {
                start: 0,
                end: RangeEnd::Index(12)
            }
        );
        assert_eq!(
            "3:9".parse::<RecordRange>().unwrap(),
            RecordRange {
                start: 3,
                end: RangeEnd::Index(9)
            }
        );
        assert_eq!(
            "3:n".parse::<RecordRange>().unwrap(),
            RecordRange {
                start: 3,
                end: RangeEnd::Oldest
            }
        );
        assert!("x:3".parse::<RecordRange>().is_err());
        assert!("-1".parse::<RecordRange>().is_err());
    }

    #[test]
    fn test_record_range_resolution() {
        let range: RecordRange = "5:2".parse().unwrap();
        assert_eq!(range.resolve(10).unwrap(), 5..=5);

        assert_eq!(RecordRange::ALL.resolve(10).unwrap(), 0..=9);
        assert_eq!(
            "3:10".parse::<RecordRange>().unwrap().resolve(10),
            Err(CliError::EndBeyondStored { end: 10, stored: 10 })
        );
        assert_eq!(RecordRange::default().resolve(0), Err(CliError::NoRecords));
    }

    #[test]
    fn test_memory_range_forms() {
        assert_eq!(
            "0x100:0x200".parse::<MemoryRange>().unwrap(),
            MemoryRange {
                start: 0x100,
                end: 0x200
            }
        );
        assert_eq!(
            ":20".parse::<MemoryRange>().unwrap(),
            MemoryRange { start: 0, end: 0x20 }
        );
        assert_eq!(
            "ff00".parse::<MemoryRange>().unwrap(),
            MemoryRange {
                start: 0xFF00,
                end: 0x1_0000
            }
        );
        assert!("200:100".parse::<MemoryRange>().is_err());
        assert!(":0".parse::<MemoryRange>().is_err());
        assert!(":10001".parse::<MemoryRange>().is_err());
        assert!("zz".parse::<MemoryRange>().is_err());
        assert_eq!(MemoryRange::default().len(), 0x1_0000);
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["wsreader", "header"]).expect("parse");
        assert_eq!(cli.device, None);
        assert_eq!(cli.print_spec, PrintSpec::default());
        assert_eq!(cli.separator, ", ");
        assert_eq!(cli.log_level(), "warn");
        assert!(matches!(cli.target(), StoreTarget::Device(_)));
        assert_eq!(
            cli.report_style(),
            ReportStyle::Compact {
                separator: ", ".to_string()
            }
        );
    }

    #[test]
    fn test_cli_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "wsreader", "records", "0:5", "--file", "dump.bin", "-p", "auR", "-vv", "--json",
        ])
        .expect("parse");
        assert_eq!(cli.target(), StoreTarget::File(PathBuf::from("dump.bin")));
        assert!(cli.print_spec.needs_timestamp());
        assert_eq!(cli.log_level(), "debug");
        assert_eq!(cli.report_style(), ReportStyle::Json);
    }

    #[test]
    fn test_cli_usb_identifier() {
        let cli = Cli::try_parse_from([
            "wsreader", "--file", ":usb:", "--device", "/dev/hidraw4", "header",
        ])
        .expect("parse");
        assert_eq!(
            cli.target(),
            StoreTarget::Device(PathBuf::from("/dev/hidraw4"))
        );
    }

    #[test]
    fn test_cli_rejects_bad_input() {
        assert!(Cli::try_parse_from(["wsreader", "-p", "ahz", "header"]).is_err());
        assert!(Cli::try_parse_from(["wsreader", "since", "yesterday"]).is_err());
        assert!(Cli::try_parse_from(["wsreader", "--json", "--headings", "header"]).is_err());
    }

    #[test]
    fn test_since_date() {
        let cli = Cli::try_parse_from(["wsreader", "since", "2024-03-15 14:30"]).expect("parse");
        let Command::Since { date } = cli.command else {
            panic!("expected since");
        };
        assert_eq!(wsreader_formats::format_timestamp(&date), "2024-03-15 14:30");
    }
}
