//! Append-only CSV [`HistoryLog`].

use std::future::Future;
use std::path::PathBuf;

use tokio::io::AsyncWriteExt;

use heatpilot_app::ports::HistoryLog;
use heatpilot_domain::error::HeatPilotError;
use heatpilot_domain::history::{HistoryColumn, HistoryRow, header};

use crate::error::StorageError;

/// One CSV line per cycle; the header is written when the file is created.
#[derive(Debug, Clone)]
pub struct CsvHistoryLog {
    path: PathBuf,
}

impl CsvHistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn write_row(&self, row: &HistoryRow, columns: &[HistoryColumn]) -> Result<(), StorageError> {
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .map_err(StorageError::io(&self.path))?;

        let mut writer = csv::Writer::from_writer(vec![]);
        if !exists {
            writer.write_record(header(columns))?;
        }
        writer.write_record(row.record())?;
        let bytes = writer
            .into_inner()
            .map_err(|err| StorageError::io(&self.path)(err.into_error()))?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(StorageError::io(&self.path))?;
        file.write_all(&bytes)
            .await
            .map_err(StorageError::io(&self.path))?;
        file.flush().await.map_err(StorageError::io(&self.path))
    }
}

impl HistoryLog for CsvHistoryLog {
    fn append(
        &self,
        row: &HistoryRow,
        columns: &[HistoryColumn],
    ) -> impl Future<Output = Result<(), HeatPilotError>> + Send {
        async move { Ok(self.write_row(row, columns).await?) }
    }
}
