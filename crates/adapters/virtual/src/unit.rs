//! Virtual air-to-air unit — holds power, target and mode in memory.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Deserialize;

use heatpilot_domain::device::{Device, DeviceCommand, OperationMode};
use heatpilot_domain::error::HeatPilotError;

/// Initial state of one simulated unit.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitSpec {
    pub name: String,
    #[serde(default)]
    pub power: bool,
    #[serde(default = "default_target")]
    pub target_temperature: f64,
    #[serde(default)]
    pub operation_mode: OperationMode,
}

fn default_target() -> f64 {
    20.0
}

impl UnitSpec {
    pub fn new(name: impl Into<String>, power: bool, target_temperature: f64) -> Self {
        Self {
            name: name.into(),
            power,
            target_temperature,
            operation_mode: OperationMode::Heat,
        }
    }
}

/// A simulated unit that obeys every command it receives.
pub struct VirtualUnit {
    id: String,
    state: Mutex<Device>,
}

impl VirtualUnit {
    /// Build a unit whose id is `virtual-{index}`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty name or a non-finite target.
    pub fn new(index: usize, spec: &UnitSpec) -> Result<Self, HeatPilotError> {
        let id = format!("virtual-{index}");
        let device = Device::builder()
            .id(id.clone())
            .name(spec.name.clone())
            .power(spec.power)
            .target_temperature(spec.target_temperature)
            .operation_mode(spec.operation_mode)
            .build()?;
        Ok(Self {
            id,
            state: Mutex::new(device),
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Device {
        self.lock_state().clone()
    }

    /// Apply a command.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty or non-finite command.
    pub fn handle(&self, command: &DeviceCommand) -> Result<Device, HeatPilotError> {
        command.validate()?;
        let mut state = self.lock_state();
        state.apply(command);
        Ok(state.clone())
    }

    /// Change the unit as a person at the remote would.
    pub fn set_by_hand(&self, power: bool, target_temperature: f64) {
        let mut state = self.lock_state();
        state.power = power;
        state.target_temperature = target_temperature;
    }

    fn lock_state(&self) -> MutexGuard<'_, Device> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> VirtualUnit {
        VirtualUnit::new(0, &UnitSpec::new("Salón", false, 19.0)).unwrap()
    }

    #[test]
    fn should_expose_initial_state() {
        let device = unit().snapshot();
        assert_eq!(device.id, "virtual-0");
        assert_eq!(device.name, "Salón");
        assert!(!device.power);
    }

    #[test]
    fn should_obey_heat_command() {
        let unit = unit();
        let device = unit.handle(&DeviceCommand::heat_to(22.5)).unwrap();
        assert!(device.power);
        assert!((device.target_temperature - 22.5).abs() < f64::EPSILON);
        assert_eq!(unit.snapshot(), device);
    }

    #[test]
    fn should_reject_empty_command() {
        let result = unit().handle(&DeviceCommand::default());
        assert!(matches!(result, Err(HeatPilotError::Validation(_))));
    }

    #[test]
    fn should_reflect_manual_change() {
        let unit = unit();
        unit.set_by_hand(true, 24.0);
        let device = unit.snapshot();
        assert!(device.power);
        assert!((device.target_temperature - 24.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_reject_empty_name() {
        let result = VirtualUnit::new(1, &UnitSpec::new("", true, 20.0));
        assert!(result.is_err());
    }
}
