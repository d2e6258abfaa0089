//! In-memory port fakes shared by the service tests.

use std::future::Future;
use std::sync::Mutex;

use heatpilot_domain::device::{Device, DeviceCommand};
use heatpilot_domain::error::{HeatPilotError, NotFoundError};
use heatpilot_domain::history::{HistoryColumn, HistoryRow};

use crate::ports::{
    CommandChannel, DeviceRegistry, HistoryLog, InboundMessage, PersistedState, StateStore,
    WeatherSource,
};

fn unavailable(what: &str) -> HeatPilotError {
    HeatPilotError::Unavailable(Box::new(std::io::Error::other(format!("{what} is down"))))
}

// ── Weather ────────────────────────────────────────────────────────

pub struct FakeWeather(pub Option<f64>);

impl WeatherSource for FakeWeather {
    fn current_temperature(&self) -> impl Future<Output = Result<f64, HeatPilotError>> + Send {
        let reading = self.0.ok_or_else(|| unavailable("weather"));
        async { reading }
    }
}

// ── Device registry ────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeRegistry {
    devices: Mutex<Vec<Device>>,
    refresh_failures: Vec<String>,
    apply_failures: Vec<String>,
    applied: Mutex<Vec<(String, DeviceCommand)>>,
}

impl FakeRegistry {
    pub fn with(devices: Vec<Device>) -> Self {
        Self {
            devices: Mutex::new(devices),
            ..Self::default()
        }
    }

    pub fn failing_refresh(mut self, name: &str) -> Self {
        self.refresh_failures.push(name.to_string());
        self
    }

    pub fn failing_apply(mut self, name: &str) -> Self {
        self.apply_failures.push(name.to_string());
        self
    }

    /// Simulate a human touching the device.
    pub fn set_by_hand(&self, name: &str, power: bool, target: f64) {
        let mut devices = self.devices.lock().unwrap();
        if let Some(device) = devices.iter_mut().find(|d| d.name == name) {
            device.power = power;
            device.target_temperature = target;
        }
    }

    pub fn device(&self, name: &str) -> Device {
        self.devices
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.name == name)
            .cloned()
            .unwrap()
    }

    pub fn applied(&self) -> Vec<(String, DeviceCommand)> {
        self.applied.lock().unwrap().clone()
    }
}

impl DeviceRegistry for FakeRegistry {
    fn list_devices(&self) -> impl Future<Output = Result<Vec<Device>, HeatPilotError>> + Send {
        let devices = self.devices.lock().unwrap().clone();
        async { Ok(devices) }
    }

    fn refresh(
        &self,
        device: &Device,
    ) -> impl Future<Output = Result<Device, HeatPilotError>> + Send {
        let result = if self.refresh_failures.contains(&device.name) {
            Err(unavailable(&device.name))
        } else {
            self.devices
                .lock()
                .unwrap()
                .iter()
                .find(|d| d.id == device.id)
                .cloned()
                .ok_or_else(|| {
                    NotFoundError {
                        entity: "Device",
                        id: device.id.clone(),
                    }
                    .into()
                })
        };
        async { result }
    }

    fn apply(
        &self,
        device: &Device,
        command: &DeviceCommand,
    ) -> impl Future<Output = Result<(), HeatPilotError>> + Send {
        let result = if self.apply_failures.contains(&device.name) {
            Err(unavailable(&device.name))
        } else {
            let mut devices = self.devices.lock().unwrap();
            if let Some(stored) = devices.iter_mut().find(|d| d.id == device.id) {
                stored.apply(command);
            }
            self.applied
                .lock()
                .unwrap()
                .push((device.name.clone(), *command));
            Ok(())
        };
        async { result }
    }
}

// ── Command channel ────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeChannel {
    inbound: Vec<InboundMessage>,
    fail_poll: bool,
    fail_send: bool,
    sent: Mutex<Vec<String>>,
}

impl FakeChannel {
    pub fn with_messages(inbound: Vec<InboundMessage>) -> Self {
        Self {
            inbound,
            ..Self::default()
        }
    }

    pub fn failing_poll() -> Self {
        Self {
            fail_poll: true,
            ..Self::default()
        }
    }

    pub fn failing_send(mut self) -> Self {
        self.fail_send = true;
        self
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl CommandChannel for FakeChannel {
    fn poll(
        &self,
        since_id: i64,
    ) -> impl Future<Output = Result<Vec<InboundMessage>, HeatPilotError>> + Send {
        let result = if self.fail_poll {
            Err(unavailable("chat"))
        } else {
            Ok(self
                .inbound
                .iter()
                .filter(|m| m.id > since_id)
                .cloned()
                .collect())
        };
        async { result }
    }

    fn send(&self, text: &str) -> impl Future<Output = Result<(), HeatPilotError>> + Send {
        let result = if self.fail_send {
            Err(unavailable("chat"))
        } else {
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        };
        async { result }
    }
}

// ── State store ────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeStore {
    state: Mutex<PersistedState>,
    saves: Mutex<usize>,
}

impl FakeStore {
    pub fn with(state: PersistedState) -> Self {
        Self {
            state: Mutex::new(state),
            saves: Mutex::new(0),
        }
    }

    pub fn state(&self) -> PersistedState {
        self.state.lock().unwrap().clone()
    }

    pub fn saves(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

impl StateStore for FakeStore {
    fn load(&self) -> impl Future<Output = Result<PersistedState, HeatPilotError>> + Send {
        let state = self.state.lock().unwrap().clone();
        async { Ok(state) }
    }

    fn save(
        &self,
        state: &PersistedState,
    ) -> impl Future<Output = Result<(), HeatPilotError>> + Send {
        *self.state.lock().unwrap() = state.clone();
        *self.saves.lock().unwrap() += 1;
        async { Ok(()) }
    }
}

// ── History ────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeHistory {
    rows: Mutex<Vec<HistoryRow>>,
}

impl FakeHistory {
    pub fn rows(&self) -> Vec<HistoryRow> {
        self.rows.lock().unwrap().clone()
    }
}

impl HistoryLog for FakeHistory {
    fn append(
        &self,
        row: &HistoryRow,
        _columns: &[HistoryColumn],
    ) -> impl Future<Output = Result<(), HeatPilotError>> + Send {
        self.rows.lock().unwrap().push(row.clone());
        async { Ok(()) }
    }
}
