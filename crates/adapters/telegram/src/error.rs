//! Telegram adapter error types.

use heatpilot_domain::error::HeatPilotError;

/// Errors specific to the Telegram adapter.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    /// The HTTP client could not be built or a request failed.
    #[error("telegram request failed")]
    Http(#[from] reqwest::Error),

    /// The Bot API answered `ok: false`.
    #[error("telegram API error: {0}")]
    Api(String),
}

impl TelegramError {
    /// Convert into a [`HeatPilotError::Unavailable`] for propagation across
    /// port boundaries.
    pub fn into_domain(self) -> HeatPilotError {
        HeatPilotError::Unavailable(Box::new(self))
    }
}

impl From<TelegramError> for HeatPilotError {
    fn from(err: TelegramError) -> Self {
        err.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_api_error() {
        let err = TelegramError::Api("Unauthorized".to_string());
        assert_eq!(err.to_string(), "telegram API error: Unauthorized");
    }

    #[test]
    fn should_convert_to_unavailable() {
        let err: HeatPilotError = TelegramError::Api("Conflict".to_string()).into();
        assert!(matches!(err, HeatPilotError::Unavailable(_)));
    }
}
