/*!
 * Error types for the srtlingo application.
 *
 * This module contains custom error types for the different layers of the
 * application, using the thiserror crate for ergonomic error definitions.
 * Capability errors are recovered locally by the batch translator; only
 * document-level failures ever reach the controller.
 */

use thiserror::Error;

/// Errors that can occur when talking to a translation capability
#[derive(Error, Debug)]
pub enum CapabilityError {
    /// Error when making a request fails
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing a response fails
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Error returned by the service itself
    #[error("Service responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the service
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// A batch call returned a different number of items than it was given
    #[error("Batch returned {actual} items for {expected} inputs")]
    CardinalityMismatch {
        /// Number of inputs submitted
        expected: usize,
        /// Number of outputs received
        actual: usize,
    },
}

/// Errors that can occur while translating a document
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the translation capability
    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    /// Processing was interrupted between two windows
    #[error("Translation cancelled after {completed_windows} of {total_windows} windows")]
    Cancelled {
        /// Windows fully processed before the interruption
        completed_windows: usize,
        /// Windows in the document
        total_windows: usize,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a translation capability
    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(format!("{:#}", error))
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<reqwest::Error> for CapabilityError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}
