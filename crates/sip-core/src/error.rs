//! Error types for the SIP value layer

use thiserror::Error;

/// Errors raised while building or parsing SIP values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The URI text could not be interpreted
    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    /// A host component was empty or malformed
    #[error("Invalid host: {0}")]
    InvalidHost(String),

    /// Generic parse failure
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Result type for sip-core operations
pub type Result<T> = std::result::Result<T, Error>;
