//! # heatpilot-domain
//!
//! Pure domain model for the heatpilot climate controller.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, timestamps, local-time projection
//! - Define **Devices** (observed snapshots of heating/cooling units) and the
//!   **commands** the controller may send them
//! - Define **Device memory** (last-known state + manual-override lockout)
//!   and the **Global registry** (command cursor, stop flag)
//! - Define **Policy constants** and the per-cycle **Conditions**
//! - The **Decision engine**: override detection and policy selection
//! - Operator **directives**, outbound **notifications** and the
//!   **history** row schema
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod device;
pub mod directive;
pub mod engine;
pub mod history;
pub mod memory;
pub mod notification;
pub mod policy;
pub mod registry;
