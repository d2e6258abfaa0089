//! Application services — use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod command_processor;
pub mod control_cycle;
pub mod notifier;

#[cfg(test)]
mod testing;

use std::future::Future;
use std::time::Duration;

use heatpilot_domain::error::HeatPilotError;

/// Run a collaborator call, failing it if it takes longer than `limit`.
pub(crate) async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, HeatPilotError>>,
) -> Result<T, HeatPilotError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(elapsed) => Err(HeatPilotError::Unavailable(Box::new(elapsed))),
    }
}
