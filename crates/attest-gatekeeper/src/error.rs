//! Governance error types

use thiserror::Error;

/// Errors that can occur while building the governance pipeline
///
/// Evaluating a response never fails; these only arise from bad
/// configuration or pattern tables.
#[derive(Error, Debug)]
pub enum GovernanceError {
    /// A rule's pattern failed to compile
    #[error("Pattern error in rule '{rule}': {source}")]
    Pattern {
        /// Rule name
        rule: String,
        /// Compile error
        #[source]
        source: regex::Error,
    },

    /// A built-in signal pattern failed to compile
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result alias for the governance layer
pub type Result<T> = std::result::Result<T, GovernanceError>;
