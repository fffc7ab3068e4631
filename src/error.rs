//! Custom error types for bibminer.
//!
//! Every fallible stage returns `Result<T, MinerError>`. Which failures are
//! absorbed and which abort a year batch is decided by the callers in
//! [`crate::dblp`], [`crate::citeseer`] and [`crate::harvest`].

use thiserror::Error;

/// Main error type for bibminer operations.
#[derive(Debug, Error)]
pub enum MinerError {
    /// Transport failure from the HTTP client
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Remote server answered with a non-success status
    #[error("HTTP {status} for {address}")]
    Http {
        /// Status code returned by the server
        status: u16,
        /// Address that was requested
        address: String,
    },

    /// Cache or output file I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Structured document is not well-formed XML
    #[error("XML error: {0}")]
    Xml(String),

    /// Document decoded, but not into the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Expected markup structure is missing
    #[error("Structure mismatch: {0}")]
    Structure(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias using `MinerError`
pub type Result<T> = std::result::Result<T, MinerError>;

/// Extension trait for turning a missing element into a structural error
pub trait OptionExt<T> {
    /// Convert Option to Result with a structure mismatch message
    fn ok_or_structure(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_structure(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| MinerError::Structure(msg.to_string()))
    }
}
