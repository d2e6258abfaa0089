//! File locations.

use std::path::PathBuf;

use serde::Deserialize;

/// Where the controller keeps its files.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding every file below. Created on first save.
    pub directory: PathBuf,
    /// Per-device memory (last seen power/target, lockout expiry).
    pub memory_file: String,
    /// Global registry (command cursor, stop flag).
    pub registry_file: String,
    /// Append-only per-cycle history.
    pub history_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            memory_file: "device_memory.json".to_string(),
            registry_file: "registry.json".to_string(),
            history_file: "history.csv".to_string(),
        }
    }
}

impl StorageConfig {
    #[must_use]
    pub fn memory_path(&self) -> PathBuf {
        self.directory.join(&self.memory_file)
    }

    #[must_use]
    pub fn registry_path(&self) -> PathBuf {
        self.directory.join(&self.registry_file)
    }

    #[must_use]
    pub fn history_path(&self) -> PathBuf {
        self.directory.join(&self.history_file)
    }
}
