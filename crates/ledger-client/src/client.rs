//! Client orchestrator: command runs, offline queueing, opportunistic recovery.

use crate::{Config, NotificationSink, Paths};
use ledger_http_proxy::{
    CommandKind, HttpTransport, Params, Proxy, ProxyError, ProxyResult, Transport,
};
use offline_backup::{BackupError, OfflineBackup, OfflineRecoveryError};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Client for communicating with the ledger webservice.
///
/// Commands run through the proxy. A communication failure of a mutating
/// command stores it in the offline backup; every successful run
/// opportunistically drains the backup through the same proxy, bypassing
/// `safely_run` so recovery can never re-queue its own replays.
pub struct Client<T: Transport> {
    proxy: Proxy<T>,
    backup: OfflineBackup,
    sinks: Arc<dyn NotificationSink>,
    latest_error: Mutex<Option<ProxyError>>,
}

impl Client<HttpTransport> {
    /// Create a client from configuration, backed by a real HTTP transport.
    pub fn new(config: &Config, paths: &Paths, sinks: Arc<dyn NotificationSink>) -> Self {
        Self {
            proxy: Proxy::new(config.http_config()),
            backup: OfflineBackup::new(paths.offline_backup_file()),
            sinks,
            latest_error: Mutex::new(None),
        }
    }
}

impl<T: Transport> Client<T> {
    /// Create a client over a caller-supplied transport.
    pub fn with_transport(
        proxy: Proxy<T>,
        backup: OfflineBackup,
        sinks: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            proxy,
            backup,
            sinks,
            latest_error: Mutex::new(None),
        }
    }

    /// Run a command against the webservice without any offline handling.
    pub async fn run(&self, command: CommandKind, params: &Params) -> ProxyResult<Value> {
        self.proxy.run(command, params).await
    }

    /// The most recent proxy error, if the last `safely_run` failed.
    pub fn latest_error(&self) -> Option<ProxyError> {
        self.latest_error.lock().expect("latest_error lock poisoned").clone()
    }

    fn set_latest_error(&self, error: Option<ProxyError>) {
        *self.latest_error.lock().expect("latest_error lock poisoned") = error;
    }

    /// Run a command, queueing it offline on communication failure and
    /// draining the offline backup after a success.
    ///
    /// Returns whether the overall run succeeded. A failed backup drain turns
    /// the result into a failure even when the command itself succeeded, so a
    /// lingering backlog is never silent. Backup store failures are fatal and
    /// propagate as [`BackupError`].
    pub async fn safely_run(
        &self,
        command: CommandKind,
        params: &Params,
    ) -> Result<bool, BackupError> {
        match self.proxy.run(command, params).await {
            Ok(result) => {
                self.set_latest_error(None);
                self.notify_result(&result);
                self.recover_backlog().await
            }
            Err(error) => {
                self.sinks.error(&error.to_string());

                let queueable = matches!(error, ProxyError::Communication(_));
                self.set_latest_error(Some(error));

                if queueable && self.backup.append(command, params).await? {
                    self.sinks
                        .info(&format!("Stored '{command}' request in offline backup."));
                }
                Ok(false)
            }
        }
    }

    async fn recover_backlog(&self) -> Result<bool, BackupError> {
        match self.backup.recover(&self.proxy).await {
            Ok(true) => {
                self.sinks.info("Recovered offline backup.");
                Ok(true)
            }
            Ok(false) => Ok(true),
            Err(OfflineRecoveryError::Replay { command, source }) => {
                debug!(command = %command, error = %source, "Backup replay failed");
                self.sinks.error("Offline backup recovery failed!");
                Ok(false)
            }
            Err(OfflineRecoveryError::Store(error)) => Err(error),
        }
    }

    fn notify_result(&self, result: &Value) {
        match result {
            Value::String(text) => self.sinks.info(text),
            other => self.sinks.info(&other.to_string()),
        }
    }
}
