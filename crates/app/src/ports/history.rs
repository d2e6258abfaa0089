//! History port — append-only per-cycle summary.

use std::future::Future;

use heatpilot_domain::error::HeatPilotError;
use heatpilot_domain::history::{HistoryColumn, HistoryRow};

/// Appends one summary row per cycle.
pub trait HistoryLog {
    /// Append `row`; write the header built from `columns` first if the log
    /// does not exist yet.
    fn append(
        &self,
        row: &HistoryRow,
        columns: &[HistoryColumn],
    ) -> impl Future<Output = Result<(), HeatPilotError>> + Send;
}
