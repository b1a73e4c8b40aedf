//! Replay of stored commands once the webservice is reachable again.

use crate::{OfflineBackup, OfflineRecoveryError};
use ledger_http_proxy::{CommandExecutor, CommandKind, ProxyError};
use tracing::{debug, info, warn};

impl OfflineBackup {
    /// Drain the backup by replaying each stored record through `executor`.
    ///
    /// Records are replayed strictly in arrival order. The first failing
    /// record stops the replay; it and every record after it stay in the
    /// backup, in order, and [`OfflineRecoveryError::Replay`] is returned.
    /// Successfully replayed records are removed and never re-applied.
    ///
    /// Returns `Ok(true)` when the whole backlog was drained, `Ok(false)`
    /// when there was nothing to recover (no file is created in that case).
    /// The entire read-replay-write cycle holds the store lock.
    pub async fn recover<E: CommandExecutor>(
        &self,
        executor: &E,
    ) -> Result<bool, OfflineRecoveryError> {
        let _guard = self.lock.lock().await;

        let records = self.read_records()?;
        if records.is_empty() {
            debug!("No offline backup to recover");
            return Ok(false);
        }

        let total = records.len();
        let mut replayed = 0;
        let mut failure: Option<(CommandKind, ProxyError)> = None;

        for record in &records {
            match executor.execute(record.command, &record.params).await {
                Ok(_) => replayed += 1,
                Err(error) => {
                    failure = Some((record.command, error));
                    break;
                }
            }
        }

        // Write back whatever was not successfully replayed, in original order.
        self.write_records(&records[replayed..])?;

        match failure {
            Some((command, source)) => {
                warn!(
                    command = %command,
                    replayed = replayed,
                    remaining = total - replayed,
                    error = %source,
                    "Offline backup recovery stopped at failing command"
                );
                Err(OfflineRecoveryError::Replay { command, source })
            }
            None => {
                info!(count = total, "Recovered offline backup");
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BackupRecord;
    use ledger_http_proxy::{Params, ProxyResult};
    use serde_json::{json, Value};
    use std::sync::Mutex;

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    /// Executor recording every call, failing when the predicate matches.
    struct RecordingExecutor {
        calls: Mutex<Vec<(CommandKind, Params)>>,
        fail_when: Option<Box<dyn Fn(&Params) -> bool + Send + Sync>>,
    }

    impl RecordingExecutor {
        fn succeeding() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_when: None,
            }
        }

        fn failing_when(predicate: impl Fn(&Params) -> bool + Send + Sync + 'static) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_when: Some(Box::new(predicate)),
            }
        }

        fn calls(&self) -> Vec<(CommandKind, Params)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl CommandExecutor for RecordingExecutor {
        async fn execute(&self, command: CommandKind, params: &Params) -> ProxyResult<Value> {
            self.calls.lock().unwrap().push((command, params.clone()));
            if let Some(fail_when) = &self.fail_when {
                if fail_when(params) {
                    return Err(ProxyError::Communication("service unreachable".to_string()));
                }
            }
            Ok(json!({"id": 1}))
        }
    }

    fn backup_in(dir: &tempfile::TempDir) -> OfflineBackup {
        OfflineBackup::new(dir.path().join("offline.json"))
    }

    #[tokio::test]
    async fn test_recover_of_empty_store_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let backup = backup_in(&dir);
        let executor = RecordingExecutor::succeeding();

        assert!(!backup.recover(&executor).await.unwrap());
        assert!(executor.calls().is_empty());
        assert!(!backup.path().exists());
    }

    #[tokio::test]
    async fn test_recover_replays_and_empties_store() {
        let dir = tempfile::tempdir().unwrap();
        let backup = backup_in(&dir);

        let kwargs = params(json!({
            "name": "money",
            "value": 111,
            "date": "2019-01-31",
            "collection": "123"
        }));
        backup.append(CommandKind::Add, &kwargs).await.unwrap();

        let executor = RecordingExecutor::succeeding();
        assert!(backup.recover(&executor).await.unwrap());

        let calls = executor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], (CommandKind::Add, kwargs));

        assert!(!backup.path().exists());
        assert!(backup.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recover_stops_at_first_failure_and_keeps_tail() {
        let dir = tempfile::tempdir().unwrap();
        let backup = backup_in(&dir);

        let a = params(json!({"name": "a"}));
        let b = params(json!({"name": "b"}));
        let c = params(json!({"name": "c"}));
        backup.append(CommandKind::Add, &a).await.unwrap();
        backup.append(CommandKind::Add, &b).await.unwrap();
        backup.append(CommandKind::Add, &c).await.unwrap();

        let executor =
            RecordingExecutor::failing_when(|params| params.get("name") == Some(&json!("b")));

        let err = backup.recover(&executor).await.unwrap_err();
        match err {
            OfflineRecoveryError::Replay { command, source } => {
                assert_eq!(command, CommandKind::Add);
                assert!(matches!(source, ProxyError::Communication(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // C was never attempted.
        assert_eq!(executor.calls().len(), 2);

        // B and C remain, in order.
        let remaining = backup.load().await.unwrap();
        assert_eq!(
            remaining,
            vec![
                BackupRecord {
                    command: CommandKind::Add,
                    params: b
                },
                BackupRecord {
                    command: CommandKind::Add,
                    params: c
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_records_keep_their_exact_shape() {
        let dir = tempfile::tempdir().unwrap();
        let backup = backup_in(&dir);

        let kwargs = params(json!({"name": "money", "value": 111, "collection": "123"}));
        backup.append(CommandKind::Add, &kwargs).await.unwrap();
        backup.append(CommandKind::Add, &kwargs).await.unwrap();

        let executor = RecordingExecutor::failing_when(|_| true);
        assert!(backup.recover(&executor).await.is_err());

        let remaining = backup.load().await.unwrap();
        assert_eq!(remaining.len(), 2);
        for record in remaining {
            assert_eq!(record.command, CommandKind::Add);
            assert_eq!(record.params, kwargs);
        }
    }

    #[tokio::test]
    async fn test_recover_after_partial_failure_resumes_with_tail() {
        let dir = tempfile::tempdir().unwrap();
        let backup = backup_in(&dir);

        backup
            .append(CommandKind::Add, &params(json!({"name": "a"})))
            .await
            .unwrap();
        backup
            .append(CommandKind::Add, &params(json!({"name": "b"})))
            .await
            .unwrap();

        let failing =
            RecordingExecutor::failing_when(|params| params.get("name") == Some(&json!("b")));
        assert!(backup.recover(&failing).await.is_err());
        assert_eq!(backup.load().await.unwrap().len(), 1);

        // A second recovery with a healthy service drains the rest.
        let succeeding = RecordingExecutor::succeeding();
        assert!(backup.recover(&succeeding).await.unwrap());
        assert_eq!(succeeding.calls().len(), 1);
        assert!(!backup.path().exists());
    }
}
