//! Notification sinks for user-visible client events.

use tracing::{error, info};

/// Channel through which the client reports user-visible events, e.g.
/// "Stored 'add' request in offline backup.".
///
/// The output formatter sits outside this crate; implementations decide how
/// messages reach the user.
pub trait NotificationSink: Send + Sync {
    /// Report an informational message.
    fn info(&self, message: &str);

    /// Report an error message.
    fn error(&self, message: &str);
}

/// Default sink forwarding notifications to the tracing pipeline.
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn info(&self, message: &str) {
        info!("{message}");
    }

    fn error(&self, message: &str) {
        error!("{message}");
    }
}
