//! Device memory — what the controller remembers about each device
//! between cycles.
//!
//! The remembered `power`/`target_temperature` are the baseline the
//! override detector compares fresh observations against. `lockout_until`
//! is the expiry (epoch seconds) of the manual-override lockout.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::device::{Device, DeviceCommand};

/// Persisted per-device state, keyed by device name in [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceMemory {
    pub power: bool,
    pub target_temperature: f64,
    /// Epoch seconds. Zero means "never locked".
    #[serde(
        default,
        alias = "bloqueo_hasta",
        deserialize_with = "epoch_seconds_lenient"
    )]
    pub lockout_until: i64,
}

impl DeviceMemory {
    /// A fresh record seeded from what the device reports right now.
    #[must_use]
    pub fn baseline(observed: &Device) -> Self {
        Self {
            power: observed.power,
            target_temperature: observed.target_temperature,
            lockout_until: 0,
        }
    }

    /// Whether automation must keep its hands off the device at `now`.
    #[must_use]
    pub fn is_locked(&self, now: i64) -> bool {
        now <= self.lockout_until
    }

    /// Arm the lockout for `duration_secs` starting at `now`.
    ///
    /// The expiry never moves backwards.
    pub fn arm_lockout(&mut self, now: i64, duration_secs: i64) {
        self.lockout_until = self.lockout_until.max(now.saturating_add(duration_secs));
    }

    /// Replace the comparison baseline with what was just observed.
    pub fn remember(&mut self, observed: &Device) {
        self.power = observed.power;
        self.target_temperature = observed.target_temperature;
    }

    /// Remember the state a successfully applied command leaves behind.
    pub fn record(&mut self, command: &DeviceCommand) {
        if let Some(power) = command.power {
            self.power = power;
        }
        if let Some(target) = command.target_temperature {
            self.target_temperature = target;
        }
    }
}

/// Accept integral or fractional epoch seconds; fractions are truncated.
fn epoch_seconds_lenient<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    if !secs.is_finite() {
        return Err(serde::de::Error::custom("lockout_until must be finite"));
    }
    #[allow(clippy::cast_possible_truncation)]
    Ok(secs.trunc() as i64)
}

/// All device memories, keyed by device name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    devices: BTreeMap<String, DeviceMemory>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the memory for `observed`, creating a baseline record if the
    /// device has never been seen.
    pub fn entry(&mut self, observed: &Device) -> &mut DeviceMemory {
        self.devices
            .entry(observed.name.clone())
            .or_insert_with(|| DeviceMemory::baseline(observed))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DeviceMemory> {
        self.devices.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, memory: DeviceMemory) {
        self.devices.insert(name.into(), memory);
    }

    /// Clear every lockout so automation may act on the next evaluation.
    pub fn reset_lockouts(&mut self) {
        for memory in self.devices.values_mut() {
            memory.lockout_until = 0;
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DeviceMemory)> {
        self.devices.iter()
    }
}
