//! File system paths for the client.

use crate::{ClientError, ClientResult};
use std::path::PathBuf;

/// Directory name under the platform data dir.
const APP_DIR_NAME: &str = "ledger";

/// Offline backup filename under the base directory.
const OFFLINE_BACKUP_NAME: &str = "offline.json";

/// Manages file system paths for the client.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for client data (e.g. ~/.local/share/ledger)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted in the platform data directory.
    pub fn new() -> ClientResult<Self> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| ClientError::Path("Could not determine data directory".to_string()))?;

        Ok(Self {
            base_dir: data_dir.join(APP_DIR_NAME),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory.
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (`<base>/config.json`).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the offline backup file path (`<base>/offline.json`).
    pub fn offline_backup_file(&self) -> PathBuf {
        self.base_dir.join(OFFLINE_BACKUP_NAME)
    }

    /// Ensure the base directory exists.
    pub fn ensure_dirs(&self) -> ClientResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        Ok(())
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new().expect("Failed to determine data directory")
    }
}
