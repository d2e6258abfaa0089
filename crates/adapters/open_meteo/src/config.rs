//! Open-Meteo location configuration.

use serde::Deserialize;

/// Where to read the outdoor temperature for.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenMeteoConfig {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Forecast endpoint.
    pub base_url: String,
}

impl Default for OpenMeteoConfig {
    fn default() -> Self {
        Self {
            latitude: 41.6596,
            longitude: -4.7454,
            base_url: "https://api.open-meteo.com/v1/forecast".to_string(),
        }
    }
}

impl OpenMeteoConfig {
    /// Whether the coordinates are on the globe.
    #[must_use]
    pub fn has_valid_coordinates(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}
