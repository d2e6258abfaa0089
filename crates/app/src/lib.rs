//! # heatpilot-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `WeatherSource` — current outdoor temperature
//!   - `DeviceRegistry` — list, refresh and command devices
//!   - `CommandChannel` — poll operator messages, send notifications
//!   - `StateStore` — load/save device memory and the global registry
//!   - `HistoryLog` — append the per-cycle summary row
//! - Define **driving/inbound** use-cases:
//!   - `ControlCycle` — one full reconcile pass
//!   - `CommandProcessor` — operator directives
//! - Orchestrate the domain decision engine without knowing *how* IO works
//!
//! ## Dependency rule
//! Depends on `heatpilot-domain` only (plus `tokio::time` for call timeouts).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
