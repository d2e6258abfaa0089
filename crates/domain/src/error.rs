//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`HeatPilotError`] via `From` when crossing a port boundary.

/// Base error for everything that crosses a port boundary.
#[derive(Debug, thiserror::Error)]
pub enum HeatPilotError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A remote collaborator (weather, device cloud, chat) failed or timed out.
    #[error("collaborator unavailable")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Reading or writing persisted state failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A domain invariant was violated.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("a device command must change at least one field")]
    EmptyCommand,

    #[error("{field} must be a minute of the day (0..1440), got {value}")]
    MinuteOutOfRange { field: &'static str, value: u16 },

    #[error("{field} must be a calendar month (1..=12), got {value}")]
    MonthOutOfRange { field: &'static str, value: u32 },

    #[error("active hours start and end at the same minute ({0})")]
    EmptyActiveHours(u16),

    #[error("lockout duration must be positive")]
    NonPositiveLockout,

    #[error("temperature {field} must be finite")]
    NonFiniteTemperature { field: &'static str },
}

/// Something looked up by name does not exist.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Displays an error followed by every `source()` in its chain,
/// separated by `: `.
pub struct Report<'a>(pub &'a (dyn std::error::Error + 'static));

impl std::fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(err) = source {
            write!(f, ": {err}")?;
            source = err.source();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_wrap_validation_error() {
        let err: HeatPilotError = ValidationError::EmptyName.into();
        assert!(matches!(
            err,
            HeatPilotError::Validation(ValidationError::EmptyName)
        ));
    }

    #[test]
    fn should_display_not_found_with_entity_and_id() {
        let err = NotFoundError {
            entity: "Device",
            id: "Salón".to_string(),
        };
        assert_eq!(err.to_string(), "Device Salón not found");
    }

    #[test]
    fn should_display_minute_out_of_range() {
        let err = ValidationError::MinuteOutOfRange {
            field: "active_hours.end",
            value: 1500,
        };
        assert_eq!(
            err.to_string(),
            "active_hours.end must be a minute of the day (0..1440), got 1500"
        );
    }

    #[test]
    fn should_report_whole_source_chain() {
        let io = std::io::Error::other("disk on fire");
        let err = HeatPilotError::Storage(Box::new(io));
        assert_eq!(Report(&err).to_string(), "storage error: disk on fire");
    }
}
