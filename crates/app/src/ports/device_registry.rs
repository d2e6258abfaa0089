//! Device registry port — the fixed set of controllable units.

use std::future::Future;

use heatpilot_domain::device::{Device, DeviceCommand};
use heatpilot_domain::error::HeatPilotError;

/// Lists, refreshes and commands heating/cooling units.
///
/// Implementations live in adapter crates (e.g. `adapter_melcloud`).
pub trait DeviceRegistry {
    /// Every device this registry controls.
    fn list_devices(&self) -> impl Future<Output = Result<Vec<Device>, HeatPilotError>> + Send;

    /// Fetch the current observed state of `device`.
    ///
    /// Calls for different devices are independent and may run concurrently.
    fn refresh(&self, device: &Device)
    -> impl Future<Output = Result<Device, HeatPilotError>> + Send;

    /// Ask the device to change state.
    fn apply(
        &self,
        device: &Device,
        command: &DeviceCommand,
    ) -> impl Future<Output = Result<(), HeatPilotError>> + Send;
}

impl<T: DeviceRegistry + Send + Sync> DeviceRegistry for std::sync::Arc<T> {
    fn list_devices(&self) -> impl Future<Output = Result<Vec<Device>, HeatPilotError>> + Send {
        (**self).list_devices()
    }

    fn refresh(
        &self,
        device: &Device,
    ) -> impl Future<Output = Result<Device, HeatPilotError>> + Send {
        (**self).refresh(device)
    }

    fn apply(
        &self,
        device: &Device,
        command: &DeviceCommand,
    ) -> impl Future<Output = Result<(), HeatPilotError>> + Send {
        (**self).apply(device, command)
    }
}
