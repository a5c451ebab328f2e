//! Error types for the HTTP client.

use thiserror::Error;

/// Client error type.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed before a response arrived.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// Invalid endpoint URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
