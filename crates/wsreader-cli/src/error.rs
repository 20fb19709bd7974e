//! Command-line validation errors

use thiserror::Error;

/// Errors raised while validating command-line input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    /// A print specification letter that has no field
    #[error("unknown print specification code '{0}'")]
    UnknownPrintCode(char),

    /// An empty print specification
    #[error("print specification is empty")]
    EmptyPrintSpec,

    /// Malformed `start[:end]` record range
    #[error("invalid record range '{0}'")]
    InvalidRecordRange(String),

    /// Malformed `start:end` memory range
    #[error("invalid memory range '{0}'")]
    InvalidMemoryRange(String),

    /// Record range reaching past the stored records
    #[error("invalid end record number {end}: {stored} records stored")]
    EndBeyondStored {
        /// Requested last index
        end: u32,
        /// Records stored
        stored: u32,
    },

    /// Nothing stored yet
    #[error("no records stored")]
    NoRecords,

    /// `since` date after the station clock
    #[error("date {requested} is in the future, station time is {device}")]
    FutureDate {
        /// Requested start
        requested: String,
        /// Station clock
        device: String,
    },
}
