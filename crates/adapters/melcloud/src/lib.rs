//! # heatpilot-adapter-melcloud
//!
//! [`DeviceRegistry`] backed by the MELCloud cloud service.
//!
//! ## Calls
//!
//! | Operation | Endpoint |
//! |-----------|----------|
//! | login (once per process) | `POST Login/ClientLogin` |
//! | `list_devices` | `GET User/ListDevices` |
//! | `refresh` | `GET Device/Get?id=..&buildingID=..` |
//! | `apply` | `POST Device/SetAta` |
//!
//! Only air-to-air units (`DeviceType == 0`) are exposed. The last state
//! read for each unit is cached so that a write can send it back whole,
//! with `EffectiveFlags` marking the fields the command changed.
//!
//! ## Dependency rule
//!
//! Depends on `heatpilot-app` (port traits) and `heatpilot-domain` only.

pub mod config;
pub mod error;
mod model;

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::sync::{Mutex, OnceCell};

use heatpilot_app::ports::DeviceRegistry;
use heatpilot_domain::device::{Device, DeviceCommand};
use heatpilot_domain::error::HeatPilotError;

pub use config::MelCloudConfig;
pub use error::MelCloudError;

use model::{AtaState, Building, ListedDevice, LoginRequest, LoginResponse};

const CONTEXT_HEADER: &str = "X-MitsContextKey";

/// MELCloud-backed registry of air-to-air units.
pub struct MelCloudRegistry {
    client: reqwest::Client,
    config: MelCloudConfig,
    context_key: OnceCell<String>,
    /// Device id → building id, from the last listing.
    buildings: Mutex<HashMap<String, i64>>,
    /// Device id → last state read or written.
    states: Mutex<HashMap<String, AtaState>>,
}

impl MelCloudRegistry {
    /// Build a registry whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`MelCloudError::MissingCredentials`] when no e-mail or
    /// password is configured, or [`MelCloudError::Http`] if the client
    /// cannot be built.
    pub fn new(config: MelCloudConfig, timeout: Duration) -> Result<Self, MelCloudError> {
        if !config.has_credentials() {
            return Err(MelCloudError::MissingCredentials);
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            config,
            context_key: OnceCell::new(),
            buildings: Mutex::new(HashMap::new()),
            states: Mutex::new(HashMap::new()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn context_key(&self) -> Result<&str, MelCloudError> {
        self.context_key
            .get_or_try_init(|| self.login())
            .await
            .map(String::as_str)
    }

    #[tracing::instrument(skip(self), fields(email = %self.config.email))]
    async fn login(&self) -> Result<String, MelCloudError> {
        let request = LoginRequest {
            email: &self.config.email,
            password: &self.config.password,
            language: self.config.language,
            app_version: &self.config.app_version,
            persist: true,
            captcha_response: None,
        };
        let response: LoginResponse = self
            .client
            .post(self.url("Login/ClientLogin"))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let error_id = response.error_id;
        let key = response
            .context_key()
            .ok_or(MelCloudError::LoginRejected(error_id))?;
        tracing::debug!("logged in to MELCloud");
        Ok(key)
    }

    async fn fetch_listing(&self) -> Result<Vec<ListedDevice>, MelCloudError> {
        let key = self.context_key().await?;
        let buildings: Vec<Building> = self
            .client
            .get(self.url("User/ListDevices"))
            .header(CONTEXT_HEADER, key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(buildings
            .into_iter()
            .flat_map(|building| building.structure.into_devices())
            .filter(ListedDevice::is_air_to_air)
            .collect())
    }

    async fn list(&self) -> Result<Vec<Device>, HeatPilotError> {
        let listed = self.fetch_listing().await?;

        let mut devices = Vec::with_capacity(listed.len());
        let mut buildings = self.buildings.lock().await;
        buildings.clear();
        for entry in &listed {
            let device = entry.to_device()?;
            buildings.insert(device.id.clone(), entry.building_id);
            devices.push(device);
        }
        tracing::debug!(count = devices.len(), "listed MELCloud units");
        Ok(devices)
    }

    async fn fetch_state(&self, device_id: &str) -> Result<AtaState, MelCloudError> {
        let building_id = self
            .buildings
            .lock()
            .await
            .get(device_id)
            .copied()
            .ok_or_else(|| MelCloudError::UnknownDevice(device_id.to_string()))?;

        let key = self.context_key().await?;
        let state: AtaState = self
            .client
            .get(self.url("Device/Get"))
            .query(&[("id", device_id.to_string()), ("buildingID", building_id.to_string())])
            .header(CONTEXT_HEADER, key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        self.states
            .lock()
            .await
            .insert(device_id.to_string(), state.clone());
        Ok(state)
    }

    async fn read(&self, device: &Device) -> Result<Device, HeatPilotError> {
        let state = self.fetch_state(&device.id).await?;
        state.to_device(device)
    }

    #[tracing::instrument(skip_all, fields(device = %device.name, %command))]
    async fn write(&self, device: &Device, command: &DeviceCommand) -> Result<(), HeatPilotError> {
        command.validate()?;

        let cached = self.states.lock().await.get(&device.id).cloned();
        let mut state = match cached {
            Some(state) => state,
            None => self.fetch_state(&device.id).await?,
        };
        state.apply(command);

        let key = self.context_key().await?;
        let accepted: AtaState = self
            .client
            .post(self.url("Device/SetAta"))
            .header(CONTEXT_HEADER, key)
            .json(&state)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(MelCloudError::from)?
            .json()
            .await
            .map_err(MelCloudError::from)?;

        self.states.lock().await.insert(device.id.clone(), accepted);
        Ok(())
    }
}

impl DeviceRegistry for MelCloudRegistry {
    fn list_devices(&self) -> impl Future<Output = Result<Vec<Device>, HeatPilotError>> + Send {
        self.list()
    }

    fn refresh(
        &self,
        device: &Device,
    ) -> impl Future<Output = Result<Device, HeatPilotError>> + Send {
        self.read(device)
    }

    fn apply(
        &self,
        device: &Device,
        command: &DeviceCommand,
    ) -> impl Future<Output = Result<(), HeatPilotError>> + Send {
        self.write(device, command)
    }
}
