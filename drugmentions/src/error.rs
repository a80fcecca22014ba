//! Error types for the mention engine and the pipeline runner.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for mention operations.
pub type Result<T> = std::result::Result<T, MentionError>;

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum MentionError {
    /// Loading or cleaning an input failed
    #[error("Load error: {0}")]
    Load(#[from] drugscraper::ScrapeError),

    /// A value could not be rendered as a document
    #[error("Serialization error: {0}")]
    Serialize(#[from] SerializeError),

    /// Writing or parsing JSON text failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No journal exists to rank
    #[error("empty corpus: no journal carries any drug mention")]
    EmptyCorpus,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A value reached the document serializer that has no document form.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("type {0} is not serializable")]
    UnsupportedType(&'static str),

    #[error("float {0} is not serializable")]
    NonFiniteFloat(f64),

    #[error("map key must be a string, found {0}")]
    KeyMustBeString(String),

    #[error("{0}")]
    Custom(String),
}

impl serde::ser::Error for SerializeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        SerializeError::Custom(msg.to_string())
    }
}
