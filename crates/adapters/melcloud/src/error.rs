//! MELCloud adapter error types.

use heatpilot_domain::error::{HeatPilotError, NotFoundError};

/// Errors specific to the MELCloud adapter.
#[derive(Debug, thiserror::Error)]
pub enum MelCloudError {
    /// No e-mail or password configured.
    #[error("MELCloud credentials missing")]
    MissingCredentials,

    /// The HTTP client could not be built or a request failed.
    #[error("MELCloud request failed")]
    Http(#[from] reqwest::Error),

    /// Login answered without a session key.
    #[error("MELCloud login rejected (error id {0:?})")]
    LoginRejected(Option<i64>),

    /// The API answered with a body we could not interpret.
    #[error("unexpected MELCloud payload")]
    Payload(#[from] serde_json::Error),

    /// The device was not part of the last listing.
    #[error("device {0} is unknown to MELCloud")]
    UnknownDevice(String),
}

impl MelCloudError {
    /// Convert into a [`HeatPilotError`] for propagation across port
    /// boundaries.
    pub fn into_domain(self) -> HeatPilotError {
        match self {
            Self::UnknownDevice(id) => NotFoundError {
                entity: "Device",
                id,
            }
            .into(),
            other => HeatPilotError::Unavailable(Box::new(other)),
        }
    }
}

impl From<MelCloudError> for HeatPilotError {
    fn from(err: MelCloudError) -> Self {
        err.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_login_rejection() {
        let err = MelCloudError::LoginRejected(Some(1));
        assert_eq!(err.to_string(), "MELCloud login rejected (error id Some(1))");
    }

    #[test]
    fn should_convert_unknown_device_to_not_found() {
        let err: HeatPilotError = MelCloudError::UnknownDevice("42".to_string()).into();
        assert!(matches!(err, HeatPilotError::NotFound(_)));
    }

    #[test]
    fn should_convert_other_errors_to_unavailable() {
        let err: HeatPilotError = MelCloudError::MissingCredentials.into();
        assert!(matches!(err, HeatPilotError::Unavailable(_)));
    }
}
