//! # heatpilot-adapter-storage-json
//!
//! File-backed persistence.
//!
//! | Port | Type | Format |
//! |------|------|--------|
//! | [`StateStore`](heatpilot_app::ports::StateStore) | [`JsonStateStore`] | two JSON files, replaced whole on save |
//! | [`HistoryLog`](heatpilot_app::ports::HistoryLog) | [`CsvHistoryLog`] | append-only CSV |
//!
//! ## Dependency rule
//!
//! Depends on `heatpilot-app` (port traits) and `heatpilot-domain` only.

pub mod config;
pub mod error;
pub mod history;
pub mod state;

pub use config::StorageConfig;
pub use error::StorageError;
pub use history::CsvHistoryLog;
pub use state::JsonStateStore;

impl StorageConfig {
    /// State store over the configured memory and registry files.
    #[must_use]
    pub fn state_store(&self) -> JsonStateStore {
        JsonStateStore::new(self.memory_path(), self.registry_path())
    }

    /// History log over the configured CSV file.
    #[must_use]
    pub fn history_log(&self) -> CsvHistoryLog {
        CsvHistoryLog::new(self.history_path())
    }
}
