//! Device — a controllable heating/cooling unit as observed this cycle,
//! and the commands the controller may send to it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HeatPilotError, ValidationError};

/// Two setpoints closer than this are the same setpoint.
const TEMPERATURE_TOLERANCE: f64 = 1e-6;

/// Compare two setpoints in °C.
#[must_use]
pub fn same_temperature(a: f64, b: f64) -> bool {
    (a - b).abs() < TEMPERATURE_TOLERANCE
}

/// Operating mode exposed by an air-to-air unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    #[default]
    Heat,
    Dry,
    Cool,
    Fan,
    Auto,
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Heat => "heat",
            Self::Dry => "dry",
            Self::Cool => "cool",
            Self::Fan => "fan",
            Self::Auto => "auto",
        };
        f.write_str(name)
    }
}

/// Snapshot of a device as last refreshed from its registry.
///
/// `id` is an opaque handle owned by the registry adapter; `name` is the
/// unique, human-facing key used for memory, objectives and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub power: bool,
    pub target_temperature: f64,
    pub operation_mode: OperationMode,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HeatPilotError::Validation`] when `name` is empty or the
    /// target temperature is not a finite number.
    pub fn validate(&self) -> Result<(), HeatPilotError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if !self.target_temperature.is_finite() {
            return Err(ValidationError::NonFiniteTemperature {
                field: "target_temperature",
            }
            .into());
        }
        Ok(())
    }

    /// Whether the device is on and already heating towards `objective`.
    #[must_use]
    pub fn is_heating_to(&self, objective: f64) -> bool {
        self.power && same_temperature(self.target_temperature, objective)
    }

    /// Apply a command to this snapshot, as the registry would.
    pub fn apply(&mut self, command: &DeviceCommand) {
        if let Some(power) = command.power {
            self.power = power;
        }
        if let Some(target) = command.target_temperature {
            self.target_temperature = target;
        }
        if let Some(mode) = command.operation_mode {
            self.operation_mode = mode;
        }
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<String>,
    name: Option<String>,
    power: bool,
    target_temperature: Option<f64>,
    operation_mode: OperationMode,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn power(mut self, power: bool) -> Self {
        self.power = power;
        self
    }

    #[must_use]
    pub fn target_temperature(mut self, target: f64) -> Self {
        self.target_temperature = Some(target);
        self
    }

    #[must_use]
    pub fn operation_mode(mut self, mode: OperationMode) -> Self {
        self.operation_mode = mode;
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// The `id` defaults to the name when not given.
    ///
    /// # Errors
    ///
    /// Returns [`HeatPilotError::Validation`] if `name` is missing or empty.
    pub fn build(self) -> Result<Device, HeatPilotError> {
        let name = self.name.unwrap_or_default();
        let device = Device {
            id: self.id.unwrap_or_else(|| name.clone()),
            name,
            power: self.power,
            target_temperature: self.target_temperature.unwrap_or(20.0),
            operation_mode: self.operation_mode,
        };
        device.validate()?;
        Ok(device)
    }
}

/// A requested change of device state. Absent fields are left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceCommand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_mode: Option<OperationMode>,
}

impl DeviceCommand {
    /// Switch the device off and touch nothing else.
    #[must_use]
    pub fn power_off() -> Self {
        Self {
            power: Some(false),
            ..Self::default()
        }
    }

    /// Switch the device on, in heating mode, targeting `objective`.
    #[must_use]
    pub fn heat_to(objective: f64) -> Self {
        Self {
            power: Some(true),
            target_temperature: Some(objective),
            operation_mode: Some(OperationMode::Heat),
        }
    }

    /// Check that the command changes something.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyCommand`] when every field is absent.
    pub fn validate(&self) -> Result<(), HeatPilotError> {
        if self.power.is_none() && self.target_temperature.is_none() && self.operation_mode.is_none()
        {
            return Err(ValidationError::EmptyCommand.into());
        }
        if self.target_temperature.is_some_and(|t| !t.is_finite()) {
            return Err(ValidationError::NonFiniteTemperature {
                field: "target_temperature",
            }
            .into());
        }
        Ok(())
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(power) = self.power {
            parts.push(format!("power={}", if power { "on" } else { "off" }));
        }
        if let Some(target) = self.target_temperature {
            parts.push(format!("target={target}°C"));
        }
        if let Some(mode) = self.operation_mode {
            parts.push(format!("mode={mode}"));
        }
        f.write_str(&parts.join(", "))
    }
}
