//! Error types for store access

use thiserror::Error;
use wsreader_formats::{Address, FormatError};

/// Errors that can occur while reading a station store
#[derive(Debug, Error)]
pub enum StoreError {
    /// A physical read returned fewer bytes than the request needed
    #[error("end of data at {address:#06x}: wanted {expected} bytes, got {actual}")]
    EndOfData {
        /// First address of the failed request
        address: Address,
        /// Bytes requested
        expected: usize,
        /// Bytes actually read
        actual: usize,
    },

    /// Record index beyond the stored record count
    #[error("invalid record index {index}: {stored} records stored")]
    InvalidIndex {
        /// Requested logical index
        index: u32,
        /// Records stored according to the header
        stored: u32,
    },

    /// Operation on a handle that was never opened or is already closed
    #[error("store is not open")]
    NotOpen,

    /// Unknown header field name
    #[error("header field not found: {0}")]
    NotFound(String),

    /// Neither backend could be established
    #[error("failed to open {target}: {source}")]
    OpenError {
        /// Identifier of the store that failed to open
        target: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Header values point outside the address space
    #[error("corrupt header: {0}")]
    CorruptHeader(String),

    /// Decoding error
    #[error("decode error: {0}")]
    Format(#[from] FormatError),

    /// Transport I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Category of a [`StoreError`], kept as the cursor's sticky error flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`StoreError::EndOfData`]
    EndOfData,
    /// See [`StoreError::InvalidIndex`]
    InvalidIndex,
    /// See [`StoreError::NotOpen`]
    NotOpen,
    /// See [`StoreError::NotFound`]
    NotFound,
    /// See [`StoreError::OpenError`]
    OpenError,
    /// See [`StoreError::CorruptHeader`]
    CorruptHeader,
    /// See [`StoreError::Format`]
    Format,
    /// See [`StoreError::Io`]
    Io,
}

impl StoreError {
    /// Category of this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EndOfData { .. } => ErrorKind::EndOfData,
            Self::InvalidIndex { .. } => ErrorKind::InvalidIndex,
            Self::NotOpen => ErrorKind::NotOpen,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::OpenError { .. } => ErrorKind::OpenError,
            Self::CorruptHeader(_) => ErrorKind::CorruptHeader,
            Self::Format(_) => ErrorKind::Format,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
