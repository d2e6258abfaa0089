//! State store port — durable device memory and global registry.

use std::future::Future;

use heatpilot_domain::error::HeatPilotError;
use heatpilot_domain::memory::MemoryStore;
use heatpilot_domain::registry::GlobalRegistry;

/// Everything that must survive between cycles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedState {
    pub memory: MemoryStore,
    pub registry: GlobalRegistry,
}

/// Loads state once at cycle start and saves it once at cycle end.
pub trait StateStore {
    /// Load the persisted state.
    ///
    /// Missing or unparseable state yields defaults; only genuine IO
    /// failures are errors.
    fn load(&self) -> impl Future<Output = Result<PersistedState, HeatPilotError>> + Send;

    /// Overwrite the persisted state.
    fn save(
        &self,
        state: &PersistedState,
    ) -> impl Future<Output = Result<(), HeatPilotError>> + Send;
}
