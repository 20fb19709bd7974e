//! Error types for decoding station memory

use thiserror::Error;

/// Errors raised while decoding raw station bytes
#[derive(Debug, Error)]
pub enum FormatError {
    /// Fewer bytes were supplied than the value's width requires
    #[error("short input: expected {expected} bytes, got {actual}")]
    ShortInput {
        /// Bytes required by the scalar kind or layout
        expected: usize,
        /// Bytes actually supplied
        actual: usize,
    },

    /// A packed date did not render to a valid calendar value
    #[error("invalid packed date '{rendered}'")]
    InvalidDate {
        /// The hex rendering that failed to parse
        rendered: String,
    },

    /// No header field with this name exists in the catalog
    #[error("unknown header field: {0}")]
    UnknownField(String),

    /// Binary layout error from binrw
    #[error("binary layout error: {0}")]
    Binary(#[from] binrw::Error),
}

/// Result type alias for decoding operations
pub type FormatResult<T> = Result<T, FormatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = FormatError::ShortInput {
            expected: 5,
            actual: 2,
        };
        assert_eq!(err.to_string(), "short input: expected 5 bytes, got 2");

        let err = FormatError::UnknownField("windgust".to_string());
        assert_eq!(err.to_string(), "unknown header field: windgust");

        let err = FormatError::InvalidDate {
            rendered: "20ff-ff-ff ff:ff".to_string(),
        };
        assert!(err.to_string().contains("20ff-ff-ff"));
    }
}
