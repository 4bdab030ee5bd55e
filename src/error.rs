//! Error types for the EVTX flattener library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for flattening operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when reading, flattening or writing event records.
///
/// `InputUnavailable`, `OutputUnavailable`, `InvalidFormat` and `Output` are
/// fatal for a run. `Decode` and `MalformedTree` only ever describe a single
/// record; the converter skips that record and keeps going.
#[derive(Debug, Error)]
pub enum Error {
    /// The input file could not be opened or read
    #[error("Cannot open input {}: {source}", .path.display())]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output file could not be created
    #[error("Cannot create output {}: {source}", .path.display())]
    OutputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input is not an EVTX file (bad magic, truncated header)
    #[error("Invalid EVTX format: {0}")]
    InvalidFormat(String),

    /// A single record could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// A decoded record has a shape the flattener refuses (scalar root, too deep)
    #[error("Malformed event tree: {0}")]
    MalformedTree(String),

    /// Arrow / Parquet serialization error
    #[error("Output error: {0}")]
    Output(String),

    /// I/O error occurred while reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Whether the error only concerns one record and the run may continue.
    pub fn is_per_record(&self) -> bool {
        matches!(self, Error::Decode(_) | Error::MalformedTree(_))
    }
}

impl From<arrow::error::ArrowError> for Error {
    fn from(err: arrow::error::ArrowError) -> Self {
        Error::Output(err.to_string())
    }
}

impl From<parquet::errors::ParquetError> for Error {
    fn from(err: parquet::errors::ParquetError) -> Self {
        Error::Output(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_record_classification() {
        assert!(Error::Decode("bad chunk".into()).is_per_record());
        assert!(Error::MalformedTree("too deep".into()).is_per_record());
        assert!(!Error::InvalidFormat("magic".into()).is_per_record());
        assert!(!Error::Output("arrow".into()).is_per_record());
    }

    #[test]
    fn test_display_includes_path() {
        let err = Error::InputUnavailable {
            path: PathBuf::from("missing.evtx"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("missing.evtx"));
        assert!(msg.contains("not found"));
    }
}
