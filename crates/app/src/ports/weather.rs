//! Weather port — where the outdoor temperature comes from.

use std::future::Future;

use heatpilot_domain::error::HeatPilotError;

/// Supplies the current outdoor temperature.
pub trait WeatherSource {
    /// Current outdoor temperature in °C.
    ///
    /// A missing or malformed reading is an error; the cycle cannot
    /// decide anything without it.
    fn current_temperature(&self) -> impl Future<Output = Result<f64, HeatPilotError>> + Send;
}
