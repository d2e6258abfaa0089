//! Storage-specific error type wrapping filesystem and encoding errors.

use std::path::PathBuf;

use heatpilot_domain::error::HeatPilotError;

/// Errors originating from the file-backed storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing a file failed.
    #[error("could not access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize state as JSON.
    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),

    /// Failed to encode a history row.
    #[error("CSV encoding error")]
    Csv(#[from] csv::Error),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

impl From<StorageError> for HeatPilotError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
