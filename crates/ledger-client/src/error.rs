//! Client-side error types for configuration and paths.

use thiserror::Error;

/// Error type for client setup operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Path error (e.g., data directory not found)
    #[error("Path error: {0}")]
    Path(String),
}

/// Result type alias using ClientError.
pub type ClientResult<T> = Result<T, ClientError>;
