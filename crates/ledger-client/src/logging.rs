//! Logging initialization for the client.

use tracing_subscriber::EnvFilter;

/// Initialize the tracing pipeline.
///
/// The `RUST_LOG` environment variable takes precedence over the provided
/// default level. Safe to call more than once; later calls are no-ops.
pub fn init_logging(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
