//! Error types for loading and cleaning the raw inputs.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for loader operations.
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Errors raised while reading or cleaning an input file.
///
/// Every variant except `Io` describes a malformed record: the input does not
/// honour the column and value contract the mention engine relies on.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// I/O error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing error
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A required column is absent from the input
    #[error("malformed record: column '{column}' missing from {path}")]
    MissingColumn { path: PathBuf, column: &'static str },

    /// A field holds a value of the wrong shape
    #[error("malformed record: field '{field}' in {path} has unsupported value {value}")]
    InvalidField {
        path: PathBuf,
        field: &'static str,
        value: String,
    },

    /// A date string matches none of the accepted formats
    #[error("malformed record: unrecognised date '{0}'")]
    InvalidDate(String),

    /// A publication id is neither numeric nor empty
    #[error("malformed record: id '{0}' is not numeric")]
    InvalidId(String),
}
