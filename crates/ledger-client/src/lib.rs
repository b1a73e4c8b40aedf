//! Resilient client for the ledger webservice.
//!
//! The client runs commands through [`ledger_http_proxy::Proxy`]. When the
//! service is unreachable, mutating commands are stored in the
//! [`offline_backup::OfflineBackup`] and replayed on the next successful run,
//! so intermittent outages never lose data.
//!
//! ```text
//! ┌────────┐   run    ┌───────┐   HTTP   ┌────────────┐
//! │ Client │─────────▶│ Proxy │─────────▶│ webservice │
//! └───┬────┘          └───────┘          └────────────┘
//!     │ on communication failure / on success
//!     ▼
//! ┌────────────────┐
//! │ OfflineBackup  │  append / recover
//! └────────────────┘
//! ```

mod client;
mod config;
mod error;
mod logging;
mod paths;
mod sinks;

pub use client::Client;
pub use config::{Config, DEFAULT_LOG_LEVEL};
pub use error::{ClientError, ClientResult};
pub use logging::init_logging;
pub use paths::Paths;
pub use sinks::{NotificationSink, TracingSink};
