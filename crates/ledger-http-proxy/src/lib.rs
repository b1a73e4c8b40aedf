//! HTTP proxy for the ledger webservice.
//!
//! This crate provides:
//! - CommandKind: the fixed command vocabulary of the webservice API
//! - router: pure mapping from commands to HTTP request descriptors
//! - Proxy: dispatches commands over a Transport and classifies failures
//! - Transport / CommandExecutor: the capability seams consumed by callers

mod command;
mod error;
mod proxy;
mod router;
mod transport;

pub use command::{CommandKind, Params, UnknownCommand};
pub use error::{ProxyError, ProxyResult};
pub use proxy::{CommandExecutor, HttpConfig, Proxy, DEFAULT_HOST, DEFAULT_TIMEOUT_SECS};
pub use router::{RequestDescriptor, RequestPayload, DEFAULT_COLLECTION, DEFAULT_TABLE};
pub use transport::{HttpTransport, Transport, TransportError, TransportResponse};

// Re-exports so downstream crates and tests can build fake transports without
// depending on reqwest directly.
pub use reqwest::{Method, StatusCode};
