//! Error types for the knowledge layer
//!
//! Résumé parse problems never surface here; they are logged and the
//! affected facts are omitted. These errors cover configuration and I/O
//! that callers asked to see explicitly.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading knowledge
#[derive(Error, Debug)]
pub enum KnowledgeError {
    /// A source file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A source file exceeds the configured size limit
    #[error("Source too large: {path} is {size} bytes (max: {max})")]
    TooLarge {
        /// File that was rejected
        path: PathBuf,
        /// Actual size in bytes
        size: u64,
        /// Configured limit
        max: u64,
    },

    /// Availability JSON could not be parsed
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// A pattern table failed to compile
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for KnowledgeError {
    fn from(e: serde_json::Error) -> Self {
        KnowledgeError::JsonParse(e.to_string())
    }
}

/// Result alias for the knowledge layer
pub type Result<T> = std::result::Result<T, KnowledgeError>;
