//! Error types for normalization operations.
//!
//! This module defines [`NormalizeError`]. Most data problems inside a filing
//! (missing tags, unparseable numbers, malformed contexts) are not errors at all
//! and degrade to null values; the variants here cover the conditions a caller
//! has to decide on.

use thiserror::Error;

/// Errors that can occur while normalizing a filing.
#[derive(Error, Debug)]
pub enum NormalizeError {
    /// The instance document could not be parsed as XML.
    #[error("XML error: {0}")]
    Xml(String),

    /// A rule table could not be loaded.
    #[error("Config error: {0}")]
    Config(String),

    /// The filing carries no security code, so it cannot be published.
    #[error("Security code missing for document {doc_id}")]
    MissingSecurityCode {
        /// Identifier of the offending document.
        doc_id: String,
    },

    /// The filing carries no fiscal-year-end date, so it cannot be published.
    #[error("Fiscal year end missing for document {doc_id}")]
    MissingFiscalYearEnd {
        /// Identifier of the offending document.
        doc_id: String,
    },

    /// Processing a document exceeded the batch driver's time limit.
    #[error("Timed out processing {doc_id} after {elapsed:?}")]
    Timeout {
        /// Identifier of the document.
        doc_id: String,
        /// The limit that was exceeded.
        elapsed: std::time::Duration,
    },

    /// A worker task panicked or was cancelled.
    #[error("Task error: {0}")]
    Task(String),

    /// Error interacting with a fact store.
    #[error("Store error: {0}")]
    Store(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl From<serde_yaml::Error> for NormalizeError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// Result type alias using [`NormalizeError`].
pub type Result<T> = std::result::Result<T, NormalizeError>;
