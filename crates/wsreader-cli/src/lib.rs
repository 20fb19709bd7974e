//! Command-line reader for WH1080 weather station memory.
//!
//! The crate wraps `wsreader-store` with a small command set:
//! - `header`: every header field with its description
//! - `records`: decoded records by index, newest first
//! - `since`: saved records taken after a date
//! - `raw` and `dump`: hex views of records and raw memory
//! - `copy`: save a memory snapshot that `--file` can read back later
//!
//! # Example
//!
//! ```no_run
//! use wsreader_cli::Cli;
//!
//! fn main() -> anyhow::Result<()> {
//!     let cli = Cli::from_args();
//!     let stdout = std::io::stdout();
//!     wsreader_cli::run(&cli, &mut stdout.lock())
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod commands;
pub mod config;
pub mod error;
pub mod print_spec;
pub mod report;

pub use commands::{execute, run};
pub use config::{Cli, Command, MemoryRange, RangeEnd, RecordRange};
pub use error::CliError;
pub use print_spec::{DEFAULT_PRINT_SPEC, FieldCode, PrintSpec};
pub use report::{RecordReport, RecordRow, ReportStyle};
