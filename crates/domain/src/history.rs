//! Historical summary — one fixed-width row per cycle.

use serde::{Deserialize, Serialize};

use crate::device::Device;
use crate::time::LocalTime;

/// Wall-clock format of the row timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A power-flag column: which device it tracks and its header label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryColumn {
    pub device: String,
    pub label: String,
}

impl HistoryColumn {
    pub fn new(device: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            label: label.into(),
        }
    }
}

/// Columns of the deployment the controller was built for.
#[must_use]
pub fn default_columns() -> Vec<HistoryColumn> {
    vec![
        HistoryColumn::new("Salón", "salon_on"),
        HistoryColumn::new("Dormitorio", "dorm_on"),
        HistoryColumn::new("Jimena", "jimena_on"),
        HistoryColumn::new("Elisa", "elisa_on"),
    ]
}

/// Header line: timestamp, outdoor temperature, then one label per column.
#[must_use]
pub fn header(columns: &[HistoryColumn]) -> Vec<String> {
    ["date", "outdoor_temp"]
        .into_iter()
        .map(str::to_string)
        .chain(columns.iter().map(|c| c.label.clone()))
        .collect()
}

/// One cycle's summary.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub timestamp: String,
    pub outdoor_temperature: f64,
    /// One flag per column, in column order.
    pub power_flags: Vec<u8>,
}

impl HistoryRow {
    /// Build the row; a column whose device was not observed reads `0`.
    #[must_use]
    pub fn new(
        local: &LocalTime,
        outdoor_temperature: f64,
        devices: &[Device],
        columns: &[HistoryColumn],
    ) -> Self {
        let power_flags = columns
            .iter()
            .map(|column| {
                devices
                    .iter()
                    .find(|d| d.name == column.device)
                    .map_or(0, |d| u8::from(d.power))
            })
            .collect();

        Self {
            timestamp: local.format(TIMESTAMP_FORMAT).to_string(),
            outdoor_temperature,
            power_flags,
        }
    }

    /// Fields in file order. The outdoor temperature always carries one
    /// decimal.
    #[must_use]
    pub fn record(&self) -> Vec<String> {
        [
            self.timestamp.clone(),
            format!("{:.1}", self.outdoor_temperature),
        ]
            .into_iter()
            .chain(self.power_flags.iter().map(u8::to_string))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Madrid;

    fn device(name: &str, power: bool) -> Device {
        Device::builder().name(name).power(power).build().unwrap()
    }

    #[test]
    fn should_build_header_from_columns() {
        assert_eq!(
            header(&default_columns()),
            vec![
                "date",
                "outdoor_temp",
                "salon_on",
                "dorm_on",
                "jimena_on",
                "elisa_on"
            ]
        );
    }

    #[test]
    fn should_emit_flags_in_column_order() {
        let local = Madrid.with_ymd_and_hms(2025, 1, 10, 7, 5, 0).unwrap();
        let devices = vec![device("Elisa", true), device("Salón", true), device("Jimena", false)];

        let row = HistoryRow::new(&local, 4.5, &devices, &default_columns());

        assert_eq!(row.timestamp, "2025-01-10 07:05");
        assert_eq!(row.power_flags, vec![1, 0, 0, 1]);
        assert_eq!(
            row.record(),
            vec!["2025-01-10 07:05", "4.5", "1", "0", "0", "1"]
        );
    }

    #[test]
    fn should_keep_one_decimal_for_whole_temperatures() {
        let local = Madrid.with_ymd_and_hms(2025, 1, 10, 7, 5, 0).unwrap();
        let row = HistoryRow::new(&local, 8.0, &[], &default_columns());
        assert_eq!(row.record()[1], "8.0");
        let row = HistoryRow::new(&local, 12.34, &[], &default_columns());
        assert_eq!(row.record()[1], "12.3");
    }
}
