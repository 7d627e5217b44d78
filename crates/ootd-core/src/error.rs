//! Error types for ootd.

use thiserror::Error;

/// Result type alias using ootd's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ootd operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller supplied a malformed or unusable request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Referenced resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stored content exists but is empty, oversized, or not a recognized image
    #[error("Invalid content: {0}")]
    InvalidContent(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Vision model invocation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error was caused by the caller's input rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_) | Error::InvalidContent(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
