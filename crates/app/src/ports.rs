//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod command_channel;
pub mod device_registry;
pub mod history;
pub mod state_store;
pub mod weather;

pub use command_channel::{CommandChannel, InboundMessage};
pub use device_registry::DeviceRegistry;
pub use history::HistoryLog;
pub use state_store::{PersistedState, StateStore};
pub use weather::WeatherSource;
