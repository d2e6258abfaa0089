//! Policy constants and the per-cycle conditions they are evaluated against.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{HeatPilotError, ValidationError};
use crate::time::LocalTime;

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Daily window, in minutes after local midnight, during which automated
/// heating is permitted. `start` is inclusive, `end` exclusive. A window
/// whose end precedes its start wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveHours {
    pub start_minute: u16,
    pub end_minute: u16,
}

impl ActiveHours {
    #[must_use]
    pub fn contains(&self, minute_of_day: u16) -> bool {
        if self.start_minute <= self.end_minute {
            minute_of_day >= self.start_minute && minute_of_day < self.end_minute
        } else {
            minute_of_day >= self.start_minute || minute_of_day < self.end_minute
        }
    }
}

impl Default for ActiveHours {
    fn default() -> Self {
        // 06:30 .. 23:00
        Self {
            start_minute: 390,
            end_minute: 1380,
        }
    }
}

/// Inclusive month range defining winter; wraps over the new year when
/// `first > last` (e.g. October..May).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinterMonths {
    pub first: u32,
    pub last: u32,
}

impl WinterMonths {
    #[must_use]
    pub fn contains(&self, month: u32) -> bool {
        if self.first <= self.last {
            month >= self.first && month <= self.last
        } else {
            month >= self.first || month <= self.last
        }
    }
}

impl Default for WinterMonths {
    fn default() -> Self {
        Self { first: 10, last: 5 }
    }
}

/// Advisory sent when it is cold enough that the primary boiler should be
/// turned up by hand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoilerAlert {
    pub enabled: bool,
    /// Outdoor °C at or below which the alert fires (winter only).
    pub threshold: f64,
    /// Boiler flow temperature to recommend.
    pub setpoint: f64,
}

impl Default for BoilerAlert {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 1.0,
            setpoint: 73.0,
        }
    }
}

/// Immutable, process-wide control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConstants {
    /// Per-device objective temperature, keyed by device name.
    pub objectives: BTreeMap<String, f64>,
    /// Objective for devices missing from `objectives`.
    pub default_objective: f64,
    /// Below this outdoor °C every device is switched off.
    pub safety_cutoff: f64,
    /// In summer, below this outdoor °C every device is switched off.
    pub summer_cutoff: f64,
    /// In winter, at or below this outdoor °C devices heat to their objective.
    pub winter_comfort_threshold: f64,
    pub active_hours: ActiveHours,
    pub lockout_duration_secs: i64,
    pub winter_months: WinterMonths,
    pub boiler_alert: BoilerAlert,
}

impl Default for PolicyConstants {
    fn default() -> Self {
        let objectives = [
            ("Salón", 22.5),
            ("Dormitorio", 21.0),
            ("Jimena", 21.0),
            ("Elisa", 21.0),
        ]
        .into_iter()
        .map(|(name, t)| (name.to_string(), t))
        .collect();

        Self {
            objectives,
            default_objective: 21.0,
            safety_cutoff: -2.0,
            summer_cutoff: 22.0,
            winter_comfort_threshold: 19.0,
            active_hours: ActiveHours::default(),
            lockout_duration_secs: 3600,
            winter_months: WinterMonths::default(),
            boiler_alert: BoilerAlert::default(),
        }
    }
}

impl PolicyConstants {
    /// Objective temperature for the named device.
    #[must_use]
    pub fn objective_for(&self, name: &str) -> f64 {
        self.objectives
            .get(name)
            .copied()
            .unwrap_or(self.default_objective)
    }

    /// Check that the constants describe a usable policy.
    ///
    /// # Errors
    ///
    /// Returns [`HeatPilotError::Validation`] for out-of-range minutes or
    /// months, an empty active-hours window, a non-positive lockout, or
    /// non-finite temperatures.
    pub fn validate(&self) -> Result<(), HeatPilotError> {
        for (field, value) in [
            ("active_hours.start_minute", self.active_hours.start_minute),
            ("active_hours.end_minute", self.active_hours.end_minute),
        ] {
            if value >= MINUTES_PER_DAY {
                return Err(ValidationError::MinuteOutOfRange { field, value }.into());
            }
        }
        if self.active_hours.start_minute == self.active_hours.end_minute {
            return Err(ValidationError::EmptyActiveHours(self.active_hours.start_minute).into());
        }
        for (field, value) in [
            ("winter_months.first", self.winter_months.first),
            ("winter_months.last", self.winter_months.last),
        ] {
            if !(1..=12).contains(&value) {
                return Err(ValidationError::MonthOutOfRange { field, value }.into());
            }
        }
        if self.lockout_duration_secs <= 0 {
            return Err(ValidationError::NonPositiveLockout.into());
        }
        for (field, value) in [
            ("default_objective", self.default_objective),
            ("safety_cutoff", self.safety_cutoff),
            ("summer_cutoff", self.summer_cutoff),
            ("winter_comfort_threshold", self.winter_comfort_threshold),
            ("boiler_alert.threshold", self.boiler_alert.threshold),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteTemperature { field }.into());
            }
        }
        if self.objectives.values().any(|t| !t.is_finite()) {
            return Err(ValidationError::NonFiniteTemperature {
                field: "objectives",
            }
            .into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Winter,
    Summer,
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Winter => f.write_str("winter"),
            Self::Summer => f.write_str("summer"),
        }
    }
}

/// Everything about "right now" the policy selector depends on, other than
/// the device itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conditions {
    /// Epoch seconds of the cycle instant.
    pub now: i64,
    pub outdoor_temperature: f64,
    pub season: Season,
    pub active_hours: bool,
    pub stop_mode: bool,
}

impl Conditions {
    /// Derive season and active-hours flags from a local wall-clock time.
    #[must_use]
    pub fn at(
        local: &LocalTime,
        outdoor_temperature: f64,
        stop_mode: bool,
        policy: &PolicyConstants,
    ) -> Self {
        let season = if policy.winter_months.contains(local.month()) {
            Season::Winter
        } else {
            Season::Summer
        };
        #[allow(clippy::cast_possible_truncation)]
        let minute_of_day = (local.hour() * 60 + local.minute()) as u16;

        Self {
            now: local.timestamp(),
            outdoor_temperature,
            season,
            active_hours: policy.active_hours.contains(minute_of_day),
            stop_mode,
        }
    }

    #[must_use]
    pub fn is_winter(&self) -> bool {
        self.season == Season::Winter
    }

    /// Whether the boiler advisory should be sent this cycle.
    #[must_use]
    pub fn boiler_alert_due(&self, alert: &BoilerAlert) -> bool {
        alert.enabled && self.is_winter() && self.outdoor_temperature <= alert.threshold
    }
}
