//! MELCloud wire types.
//!
//! Field names follow the API's `PascalCase`. Only the fields we read are
//! typed; the device state is kept as a raw JSON object so that a write
//! sends back everything the server gave us.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use heatpilot_domain::device::{Device, DeviceCommand, OperationMode};
use heatpilot_domain::error::HeatPilotError;

/// `DeviceType` of air-to-air units.
pub const AIR_TO_AIR: i64 = 0;

const FLAG_POWER: u64 = 0x01;
const FLAG_OPERATION_MODE: u64 = 0x02;
const FLAG_SET_TEMPERATURE: u64 = 0x04;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub language: u8,
    pub app_version: &'a str,
    pub persist: bool,
    pub captcha_response: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub error_id: Option<i64>,
    #[serde(default)]
    pub login_data: Option<LoginData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginData {
    pub context_key: String,
}

impl LoginResponse {
    pub fn context_key(self) -> Option<String> {
        self.login_data
            .map(|data| data.context_key)
            .filter(|key| !key.is_empty())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Building {
    pub structure: Structure,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Structure {
    pub devices: Vec<ListedDevice>,
    pub floors: Vec<Floor>,
    pub areas: Vec<Area>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Floor {
    pub devices: Vec<ListedDevice>,
    pub areas: Vec<Area>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Area {
    pub devices: Vec<ListedDevice>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListedDevice {
    #[serde(rename = "DeviceID")]
    pub device_id: i64,
    pub device_name: String,
    #[serde(rename = "BuildingID")]
    pub building_id: i64,
    #[serde(default)]
    pub device: DeviceSummary,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DeviceSummary {
    pub device_type: i64,
    pub power: bool,
    pub set_temperature: Option<f64>,
    pub operation_mode: Option<i64>,
}

impl Structure {
    /// Every device in the building, wherever it is attached.
    pub fn into_devices(self) -> Vec<ListedDevice> {
        let mut devices = self.devices;
        for floor in self.floors {
            devices.extend(floor.devices);
            devices.extend(floor.areas.into_iter().flat_map(|a| a.devices));
        }
        devices.extend(self.areas.into_iter().flat_map(|a| a.devices));
        devices
    }
}

impl ListedDevice {
    pub fn is_air_to_air(&self) -> bool {
        self.device.device_type == AIR_TO_AIR
    }

    /// Snapshot from the listing alone, before any refresh.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the listing carries an empty name.
    pub fn to_device(&self) -> Result<Device, HeatPilotError> {
        let mut builder = Device::builder()
            .id(self.device_id.to_string())
            .name(self.device_name.clone())
            .power(self.device.power);
        if let Some(target) = self.device.set_temperature {
            builder = builder.target_temperature(target);
        }
        if let Some(mode) = self.device.operation_mode.and_then(mode_from_code) {
            builder = builder.operation_mode(mode);
        }
        builder.build()
    }
}

pub fn mode_from_code(code: i64) -> Option<OperationMode> {
    match code {
        1 => Some(OperationMode::Heat),
        2 => Some(OperationMode::Dry),
        3 => Some(OperationMode::Cool),
        7 => Some(OperationMode::Fan),
        8 => Some(OperationMode::Auto),
        _ => None,
    }
}

pub fn mode_code(mode: OperationMode) -> i64 {
    match mode {
        OperationMode::Heat => 1,
        OperationMode::Dry => 2,
        OperationMode::Cool => 3,
        OperationMode::Fan => 7,
        OperationMode::Auto => 8,
    }
}

/// Full air-to-air state as returned by `Device/Get` and accepted by
/// `Device/SetAta`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AtaState(Map<String, Value>);

impl AtaState {
    pub fn power(&self) -> bool {
        self.0.get("Power").and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn set_temperature(&self) -> Option<f64> {
        self.0.get("SetTemperature").and_then(Value::as_f64)
    }

    pub fn operation_mode(&self) -> Option<OperationMode> {
        self.0
            .get("OperationMode")
            .and_then(Value::as_i64)
            .and_then(mode_from_code)
    }

    /// Fold the state into the listed identity.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the resulting device is invalid.
    pub fn to_device(&self, listed: &Device) -> Result<Device, HeatPilotError> {
        Device::builder()
            .id(listed.id.clone())
            .name(listed.name.clone())
            .power(self.power())
            .target_temperature(self.set_temperature().unwrap_or(listed.target_temperature))
            .operation_mode(self.operation_mode().unwrap_or(listed.operation_mode))
            .build()
    }

    /// Write the command into the state and mark the changed fields.
    pub fn apply(&mut self, command: &DeviceCommand) {
        let mut flags = 0;
        if let Some(power) = command.power {
            self.0.insert("Power".to_string(), Value::Bool(power));
            flags |= FLAG_POWER;
        }
        if let Some(mode) = command.operation_mode {
            self.0
                .insert("OperationMode".to_string(), Value::from(mode_code(mode)));
            flags |= FLAG_OPERATION_MODE;
        }
        if let Some(target) = command.target_temperature {
            self.0
                .insert("SetTemperature".to_string(), Value::from(target));
            flags |= FLAG_SET_TEMPERATURE;
        }
        self.0
            .insert("EffectiveFlags".to_string(), Value::from(flags));
        self.0
            .insert("HasPendingCommand".to_string(), Value::Bool(true));
    }
}
