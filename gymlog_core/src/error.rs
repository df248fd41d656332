//! Error types for the gymlog_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for gymlog_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Store rejected or failed an operation
    #[error("Storage error: {0}")]
    Storage(String),

    /// Caller supplied malformed input (inverted rep range, negative weight, ...)
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Program validation error
    #[error("Program validation error: {0}")]
    ProgramValidation(String),

    /// Referenced exercise or program entry does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A session save failed after some sets were already persisted
    #[error("Saved {saved} of {total} sets before failing: {source}")]
    PartialSave {
        saved: usize,
        total: usize,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// True for failures coming from the persistence layer
    pub fn is_storage(&self) -> bool {
        match self {
            Error::Io(_) | Error::Json(_) | Error::Csv(_) | Error::Storage(_) => true,
            Error::PartialSave { source, .. } => source.is_storage(),
            _ => false,
        }
    }
}
