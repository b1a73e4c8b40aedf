//! Offline backup error types.

use ledger_http_proxy::{CommandKind, ProxyError};
use thiserror::Error;

/// Failures of the backup store itself.
///
/// These are fatal and local: if the store cannot be read or written, the
/// resilience mechanism is broken and the condition must not be swallowed or
/// mapped into the retryable taxonomy.
#[derive(Error, Debug)]
pub enum BackupError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using BackupError.
pub type BackupResult<T> = Result<T, BackupError>;

/// Raised when draining the offline backup does not complete.
///
/// Distinct from [`ProxyError`] so callers can tell "this request failed"
/// apart from "an unrelated backlog failed to drain".
#[derive(Error, Debug)]
pub enum OfflineRecoveryError {
    /// Replaying a stored record failed; it and every later record remain in
    /// the backup.
    #[error("Offline backup recovery failed replaying '{command}': {source}")]
    Replay {
        command: CommandKind,
        #[source]
        source: ProxyError,
    },

    /// The backup store itself failed.
    #[error(transparent)]
    Store(#[from] BackupError),
}
