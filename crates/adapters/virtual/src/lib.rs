//! # heatpilot-adapter-virtual
//!
//! Simulated collaborators for dry runs and integration tests.
//!
//! | Port | Type | Behaviour |
//! |------|------|-----------|
//! | [`DeviceRegistry`] | [`VirtualRegistry`] | in-memory units that obey every command |
//! | [`WeatherSource`] | [`VirtualWeather`] | a fixed outdoor temperature |
//!
//! The units live in process memory only. A new process either starts
//! from the configured units or, with [`VirtualRegistry::resume`], from
//! the power and target the controller remembered last time, so
//! consecutive runs see the state the previous run left behind.
//!
//! ## Dependency rule
//!
//! Depends on `heatpilot-app` (port traits) and `heatpilot-domain` only.

mod unit;

use std::future::Future;

use serde::Deserialize;

use heatpilot_app::ports::{DeviceRegistry, WeatherSource};
use heatpilot_domain::device::{Device, DeviceCommand};
use heatpilot_domain::error::{HeatPilotError, NotFoundError};
use heatpilot_domain::memory::MemoryStore;

pub use unit::{UnitSpec, VirtualUnit};

/// Simulated house.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VirtualConfig {
    /// Reading returned by [`VirtualWeather`].
    pub outdoor_temperature: f64,
    pub units: Vec<UnitSpec>,
}

impl Default for VirtualConfig {
    fn default() -> Self {
        Self {
            outdoor_temperature: 10.0,
            units: vec![
                UnitSpec::new("Salón", false, 20.0),
                UnitSpec::new("Dormitorio", false, 20.0),
                UnitSpec::new("Jimena", false, 20.0),
                UnitSpec::new("Elisa", false, 20.0),
            ],
        }
    }
}

/// Registry of simulated units.
pub struct VirtualRegistry {
    units: Vec<VirtualUnit>,
}

impl VirtualRegistry {
    /// Build one unit per spec.
    ///
    /// # Errors
    ///
    /// Returns a validation error if any spec is invalid.
    pub fn new(specs: &[UnitSpec]) -> Result<Self, HeatPilotError> {
        let units = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| VirtualUnit::new(index, spec))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { units })
    }

    /// Build one unit per spec, starting from the remembered power and
    /// target of every unit found in `memory`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if any spec is invalid.
    pub fn resume(specs: &[UnitSpec], memory: &MemoryStore) -> Result<Self, HeatPilotError> {
        let resumed: Vec<UnitSpec> = specs
            .iter()
            .map(|spec| match memory.get(&spec.name) {
                Some(remembered) => UnitSpec {
                    power: remembered.power,
                    target_temperature: remembered.target_temperature,
                    ..spec.clone()
                },
                None => spec.clone(),
            })
            .collect();
        Self::new(&resumed)
    }

    /// Look a unit up by device name.
    #[must_use]
    pub fn unit(&self, name: &str) -> Option<&VirtualUnit> {
        self.units.iter().find(|u| u.snapshot().name == name)
    }

    fn find(&self, device: &Device) -> Result<&VirtualUnit, HeatPilotError> {
        self.units
            .iter()
            .find(|u| u.id() == device.id)
            .ok_or_else(|| {
                NotFoundError {
                    entity: "Device",
                    id: device.id.clone(),
                }
                .into()
            })
    }
}

impl DeviceRegistry for VirtualRegistry {
    fn list_devices(&self) -> impl Future<Output = Result<Vec<Device>, HeatPilotError>> + Send {
        let devices = self.units.iter().map(VirtualUnit::snapshot).collect();
        async { Ok(devices) }
    }

    fn refresh(
        &self,
        device: &Device,
    ) -> impl Future<Output = Result<Device, HeatPilotError>> + Send {
        let result = self.find(device).map(VirtualUnit::snapshot);
        async { result }
    }

    fn apply(
        &self,
        device: &Device,
        command: &DeviceCommand,
    ) -> impl Future<Output = Result<(), HeatPilotError>> + Send {
        let result = self.find(device).and_then(|unit| {
            let updated = unit.handle(command)?;
            tracing::info!(device = %updated.name, %command, "virtual unit updated");
            Ok(())
        });
        async { result }
    }
}

/// Weather source that always reports the same temperature.
#[derive(Debug, Clone, Copy)]
pub struct VirtualWeather {
    temperature: f64,
}

impl VirtualWeather {
    #[must_use]
    pub fn new(temperature: f64) -> Self {
        Self { temperature }
    }
}

impl WeatherSource for VirtualWeather {
    fn current_temperature(&self) -> impl Future<Output = Result<f64, HeatPilotError>> + Send {
        let temperature = self.temperature;
        async move { Ok(temperature) }
    }
}
