//! Error types for the Extractor

use thiserror::Error;

/// The extraction service could not produce a reply for a chunk
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Extraction service call failed: {message}")]
pub struct ServiceError {
    /// Message of the underlying provider error
    pub message: String,
}

impl ServiceError {
    /// Wrap a provider error, keeping its message
    pub fn new(cause: impl std::fmt::Display) -> Self {
        Self {
            message: cause.to_string(),
        }
    }
}

/// A service reply could not be coerced into structured items
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid JSON output:\n{excerpt}")]
pub struct ParseError {
    /// Leading part of the offending reply
    pub excerpt: String,
}

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Extraction service failure
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Unusable service reply
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The document produced no pages at all
    #[error("No pages to process")]
    NoPages,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
