//! Error types for dealflow.

use thiserror::Error;

/// Result type alias using dealflow's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for dealflow operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Summary not found in the log
    #[error("Summary not found: {0}")]
    SummaryNotFound(i64),

    /// Lead not found in the repository
    #[error("Lead not found: {0}")]
    LeadNotFound(i64),

    /// Meeting unknown to the Fathom API
    #[error("Meeting not found: {0}")]
    MeetingNotFound(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error means the addressed record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::SummaryNotFound(_) | Error::LeadNotFound(_) | Error::MeetingNotFound(_)
        )
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
