//! Error taxonomy for webservice communication.

use thiserror::Error;

/// Errors surfaced when running a command against the webservice.
///
/// `InvalidRequest` is the caller's fault and is never retried or stored
/// offline. `Communication` is the environment's fault; mutating commands
/// failing this way are eligible for offline backup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProxyError {
    /// The request was malformed or referenced a nonexistent resource.
    #[error("{0}")]
    InvalidRequest(String),

    /// The webservice could not be reached or failed on its side.
    #[error("{0}")]
    Communication(String),
}

/// Result type alias using ProxyError.
pub type ProxyResult<T> = Result<T, ProxyError>;
