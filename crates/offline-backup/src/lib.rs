//! Offline backup for mutating ledger commands.
//!
//! When the webservice is unreachable, mutating commands are appended to a
//! durable JSON file in arrival order. Once the service is reachable again
//! they are replayed strictly in that order; replay stops at the first
//! failure so causally dependent commands are never applied out of order.

mod error;
mod recovery;
mod store;

pub use error::{BackupError, BackupResult, OfflineRecoveryError};
pub use store::{BackupRecord, OfflineBackup};
