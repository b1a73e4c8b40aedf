//! Durable, ordered store of pending mutating commands.

use crate::BackupResult;
use ledger_http_proxy::{CommandKind, Params};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// One pending mutating command, in the exact parameter shape it was
/// originally invoked with.
///
/// Persisted as `{"command": "...", ...params}` with the command name merged
/// into the parameter object; the file holds a JSON array of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub command: CommandKind,
    #[serde(flatten)]
    pub params: Params,
}

/// File-backed ordered backup of commands awaiting replay.
///
/// The file is absent until the first append and removed again once empty.
/// A single lock serializes `append`, `replace` and recovery so the
/// read-modify-write cycles never interleave within one process. Sharing one
/// path across processes is not supported.
pub struct OfflineBackup {
    path: PathBuf,
    pub(crate) lock: Mutex<()>,
}

impl OfflineBackup {
    /// Create a backup over the given file path. No I/O happens until the
    /// first operation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a command for later replay.
    ///
    /// Returns true if a record was appended. Non-mutating commands are
    /// rejected without touching the store, since replaying a read has no
    /// meaning.
    pub async fn append(&self, command: CommandKind, params: &Params) -> BackupResult<bool> {
        if !command.is_mutating() {
            debug!(command = %command, "Not storing non-mutating command");
            return Ok(false);
        }

        let _guard = self.lock.lock().await;
        let mut records = self.read_records()?;
        records.push(BackupRecord {
            command,
            params: params.clone(),
        });
        self.write_records(&records)?;

        info!(command = %command, pending = records.len(), "Stored command in offline backup");
        Ok(true)
    }

    /// Load all pending records in arrival order.
    ///
    /// Returns an empty vec when the backing file does not exist.
    pub async fn load(&self) -> BackupResult<Vec<BackupRecord>> {
        let _guard = self.lock.lock().await;
        self.read_records()
    }

    /// Atomically rewrite the store to contain exactly `records`.
    ///
    /// An empty slice deletes the file rather than leaving an empty one.
    pub async fn replace(&self, records: &[BackupRecord]) -> BackupResult<()> {
        let _guard = self.lock.lock().await;
        self.write_records(records)
    }

    pub(crate) fn read_records(&self) -> BackupResult<Vec<BackupRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub(crate) fn write_records(&self, records: &[BackupRecord]) -> BackupResult<()> {
        if records.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string(records)?;
        atomic_write(&self.path, &content)?;
        Ok(())
    }
}

/// Write via a temp file and rename so a crash mid-write never leaves a
/// truncated backup behind.
fn atomic_write(path: &Path, content: &str) -> std::io::Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("offline.json");

    let tmp_name = format!(
        ".{}.tmp.{}",
        file_name,
        std::time::SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    );
    let tmp_path = match dir {
        Some(dir) => dir.join(&tmp_name),
        None => PathBuf::from(&tmp_name),
    };

    let write_result = (|| -> std::io::Result<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    })();

    if let Err(err) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: serde_json::Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    fn backup_in(dir: &tempfile::TempDir) -> OfflineBackup {
        OfflineBackup::new(dir.path().join("offline.json"))
    }

    #[tokio::test]
    async fn test_append_stores_mutating_command() {
        let dir = tempfile::tempdir().unwrap();
        let backup = backup_in(&dir);

        let kwargs = params(json!({"name": "money", "value": 111, "date": "2019-01-31"}));
        assert!(backup.append(CommandKind::Add, &kwargs).await.unwrap());

        let records = backup.load().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].command, CommandKind::Add);
        assert_eq!(records[0].params, kwargs);
    }

    #[tokio::test]
    async fn test_append_rejects_non_mutating_commands() {
        let dir = tempfile::tempdir().unwrap();
        let backup = backup_in(&dir);

        for command in [CommandKind::List, CommandKind::Get, CommandKind::ServerInfo] {
            assert!(!backup.append(command, &Params::new()).await.unwrap());
        }

        // Store untouched, file never created.
        assert!(!backup.path().exists());
        assert!(backup.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_of_absent_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backup = backup_in(&dir);

        assert!(backup.load().await.unwrap().is_empty());
        assert!(!backup.path().exists());
    }

    #[tokio::test]
    async fn test_records_merge_command_into_params_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let backup = backup_in(&dir);

        backup
            .append(CommandKind::Add, &params(json!({"name": "money", "value": 111})))
            .await
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(backup.path()).unwrap()).unwrap();
        assert_eq!(raw, json!([{"command": "add", "name": "money", "value": 111}]));
    }

    #[tokio::test]
    async fn test_append_preserves_arrival_order() {
        let dir = tempfile::tempdir().unwrap();
        let backup = backup_in(&dir);

        backup
            .append(CommandKind::Add, &params(json!({"name": "a"})))
            .await
            .unwrap();
        backup
            .append(CommandKind::Update, &params(json!({"id": 1})))
            .await
            .unwrap();
        backup
            .append(CommandKind::Remove, &params(json!({"id": 2})))
            .await
            .unwrap();

        let commands: Vec<_> = backup
            .load()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.command)
            .collect();
        assert_eq!(
            commands,
            vec![CommandKind::Add, CommandKind::Update, CommandKind::Remove]
        );
    }

    #[tokio::test]
    async fn test_replace_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let backup = backup_in(&dir);

        backup
            .append(CommandKind::Add, &params(json!({"name": "a"})))
            .await
            .unwrap();
        backup
            .append(CommandKind::Remove, &params(json!({"id": 3})))
            .await
            .unwrap();

        let records = backup.load().await.unwrap();
        backup.replace(&records).await.unwrap();
        assert_eq!(backup.load().await.unwrap(), records);
    }

    #[tokio::test]
    async fn test_replace_with_empty_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let backup = backup_in(&dir);

        backup
            .append(CommandKind::Add, &params(json!({"name": "a"})))
            .await
            .unwrap();
        assert!(backup.path().exists());

        backup.replace(&[]).await.unwrap();
        assert!(!backup.path().exists());
        assert!(backup.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let backup = OfflineBackup::new(dir.path().join("nested/data/offline.json"));

        backup
            .append(CommandKind::Add, &params(json!({"name": "a"})))
            .await
            .unwrap();
        assert!(backup.path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_store_surfaces_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let backup = backup_in(&dir);
        fs::write(backup.path(), "not json").unwrap();

        let err = backup.load().await.unwrap_err();
        assert!(matches!(err, crate::BackupError::Json(_)));
    }
}
