//! # heatpilot-adapter-open-meteo
//!
//! [`WeatherSource`] backed by the public Open-Meteo forecast API.
//!
//! One `GET {base_url}?latitude=..&longitude=..&current_weather=true` per
//! cycle; the reading is `current_weather.temperature` in °C. No key is
//! required.
//!
//! ## Dependency rule
//!
//! Depends on `heatpilot-app` (port traits) and `heatpilot-domain` only.

pub mod config;
pub mod error;

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;

use heatpilot_app::ports::WeatherSource;
use heatpilot_domain::error::HeatPilotError;

pub use config::OpenMeteoConfig;
pub use error::OpenMeteoError;

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: Option<CurrentWeather>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature: Option<f64>,
}

impl ForecastResponse {
    fn temperature(&self) -> Result<f64, OpenMeteoError> {
        self.current_weather
            .as_ref()
            .and_then(|current| current.temperature)
            .filter(|t| t.is_finite())
            .ok_or(OpenMeteoError::MissingReading)
    }
}

/// Open-Meteo client for one fixed location.
#[derive(Debug, Clone)]
pub struct OpenMeteoWeather {
    client: reqwest::Client,
    config: OpenMeteoConfig,
}

impl OpenMeteoWeather {
    /// Build a client whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`OpenMeteoError::Http`] if the TLS backend cannot be
    /// initialised.
    pub fn new(config: OpenMeteoConfig, timeout: Duration) -> Result<Self, OpenMeteoError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }

    async fn fetch(&self) -> Result<f64, OpenMeteoError> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("latitude", self.config.latitude.to_string()),
                ("longitude", self.config.longitude.to_string()),
                ("current_weather", "true".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: ForecastResponse = response.json().await?;
        let temperature = body.temperature()?;
        tracing::debug!(temperature, "open-meteo reading");
        Ok(temperature)
    }
}

impl WeatherSource for OpenMeteoWeather {
    fn current_temperature(&self) -> impl Future<Output = Result<f64, HeatPilotError>> + Send {
        async move { self.fetch().await.map_err(OpenMeteoError::into_domain) }
    }
}
