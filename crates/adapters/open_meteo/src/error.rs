//! Open-Meteo adapter error types.

use heatpilot_domain::error::HeatPilotError;

/// Errors specific to the Open-Meteo adapter.
#[derive(Debug, thiserror::Error)]
pub enum OpenMeteoError {
    /// The HTTP client could not be built or the request failed.
    #[error("open-meteo request failed")]
    Http(#[source] reqwest::Error),

    /// The response carried no `current_weather.temperature`.
    #[error("open-meteo response has no current temperature")]
    MissingReading,
}

impl OpenMeteoError {
    /// Convert into a [`HeatPilotError::Unavailable`] for propagation across
    /// port boundaries.
    pub fn into_domain(self) -> HeatPilotError {
        HeatPilotError::Unavailable(Box::new(self))
    }
}

impl From<OpenMeteoError> for HeatPilotError {
    fn from(err: OpenMeteoError) -> Self {
        err.into_domain()
    }
}

impl From<reqwest::Error> for OpenMeteoError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err)
    }
}
