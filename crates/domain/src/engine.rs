//! Decision engine — decides, per device and per cycle, what automation
//! should do.
//!
//! Two pure steps, chained by [`evaluate`]:
//!
//! 1. [`detect_override`] compares the fresh observation with the device's
//!    memory. A difference that appears while the device is not locked is
//!    a manual change and arms a lockout. The memory baseline is then
//!    refreshed to the observation unconditionally.
//! 2. [`select_policy`] runs only for devices that are not locked and picks
//!    the first matching [`Rule`].
//!
//! Nothing here performs IO. The caller applies the returned command and,
//! only once the device accepted it, records it into memory with
//! [`DeviceMemory::record`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::device::{Device, DeviceCommand, same_temperature};
use crate::memory::DeviceMemory;
use crate::notification::Notification;
use crate::policy::{Conditions, PolicyConstants};

/// Control rules in evaluation order. The first that matches wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Outdoor temperature below the safety cutoff.
    SafetyCutoff,
    /// Summer and outdoor temperature below the summer cutoff.
    SummerCutoff,
    /// Operator stop flag set.
    StopMode,
    /// Winter, outside the active-hours window.
    OutsideActiveHours,
    /// Winter, active hours, cold enough to need support heating.
    WinterComfort,
    /// Nothing applies; leave the device as observed.
    NoAction,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SafetyCutoff => "safety_cutoff",
            Self::SummerCutoff => "summer_cutoff",
            Self::StopMode => "stop_mode",
            Self::OutsideActiveHours => "outside_active_hours",
            Self::WinterComfort => "winter_comfort",
            Self::NoAction => "no_action",
        };
        f.write_str(name)
    }
}

/// The matched rule and, when the device is not already in the rule's
/// desired state, the command that gets it there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub rule: Rule,
    pub command: Option<DeviceCommand>,
}

impl Verdict {
    fn idle(rule: Rule) -> Self {
        Self {
            rule,
            command: None,
        }
    }

    /// Operator message describing the command, if one is issued.
    #[must_use]
    pub fn notification(&self, device: &str) -> Option<Notification> {
        let command = self.command?;
        Some(Notification::Action {
            rule: self.rule,
            device: device.to_string(),
            objective: command.target_temperature,
        })
    }
}

/// Result of comparing an observation with memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideCheck {
    /// Observation matches memory.
    Unchanged,
    /// Newly detected manual change; a lockout was armed until `lockout_until`.
    ManualChange { lockout_until: i64 },
    /// A difference was seen while already locked; no new lockout.
    ChangedWhileLocked,
}

/// Detect an out-of-band change and arm the lockout for it.
///
/// The lockout is edge-triggered: a change seen while the device is still
/// locked never extends the window. The memory baseline is refreshed to the
/// observation in every case.
pub fn detect_override(
    memory: &mut DeviceMemory,
    observed: &Device,
    now: i64,
    lockout_duration_secs: i64,
) -> OverrideCheck {
    let changed = observed.power != memory.power
        || !same_temperature(observed.target_temperature, memory.target_temperature);

    let check = if !changed {
        OverrideCheck::Unchanged
    } else if memory.is_locked(now) {
        OverrideCheck::ChangedWhileLocked
    } else {
        memory.arm_lockout(now, lockout_duration_secs);
        OverrideCheck::ManualChange {
            lockout_until: memory.lockout_until,
        }
    };

    memory.remember(observed);
    check
}

/// Pick the rule that governs `observed` under `conditions`.
///
/// Switch-off rules only issue a command when the device is on, and the
/// comfort rule only when the device is not already heating to its
/// objective, so re-evaluating a settled device is a no-op.
#[must_use]
pub fn select_policy(
    observed: &Device,
    objective: f64,
    conditions: &Conditions,
    policy: &PolicyConstants,
) -> Verdict {
    let switch_off = |rule: Rule| Verdict {
        rule,
        command: observed.power.then(DeviceCommand::power_off),
    };

    if conditions.outdoor_temperature < policy.safety_cutoff {
        return switch_off(Rule::SafetyCutoff);
    }
    if !conditions.is_winter() && conditions.outdoor_temperature < policy.summer_cutoff {
        return switch_off(Rule::SummerCutoff);
    }
    if conditions.stop_mode {
        return switch_off(Rule::StopMode);
    }
    if !conditions.is_winter() {
        return Verdict::idle(Rule::NoAction);
    }
    if !conditions.active_hours {
        return switch_off(Rule::OutsideActiveHours);
    }
    if conditions.outdoor_temperature <= policy.winter_comfort_threshold {
        return Verdict {
            rule: Rule::WinterComfort,
            command: (!observed.is_heating_to(objective))
                .then(|| DeviceCommand::heat_to(objective)),
        };
    }
    Verdict::idle(Rule::NoAction)
}

/// What the engine concluded for one device this cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Under manual control until `until`; no rule was evaluated.
    Locked { until: i64 },
    Decided(Verdict),
}

/// Full per-device evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub override_check: OverrideCheck,
    pub outcome: Outcome,
}

impl Evaluation {
    /// The command to send, if any.
    #[must_use]
    pub fn command(&self) -> Option<DeviceCommand> {
        match self.outcome {
            Outcome::Decided(verdict) => verdict.command,
            Outcome::Locked { .. } => None,
        }
    }
}

/// Run override detection, then policy selection for unlocked devices.
pub fn evaluate(
    memory: &mut DeviceMemory,
    observed: &Device,
    conditions: &Conditions,
    policy: &PolicyConstants,
) -> Evaluation {
    let override_check = detect_override(
        memory,
        observed,
        conditions.now,
        policy.lockout_duration_secs,
    );

    let outcome = if memory.is_locked(conditions.now) {
        Outcome::Locked {
            until: memory.lockout_until,
        }
    } else {
        let objective = policy.objective_for(&observed.name);
        Outcome::Decided(select_policy(observed, objective, conditions, policy))
    };

    Evaluation {
        override_check,
        outcome,
    }
}

impl OverrideCheck {
    /// Operator message for a newly detected manual change.
    #[must_use]
    pub fn notification(&self, observed: &Device) -> Option<Notification> {
        match self {
            Self::ManualChange { .. } => Some(Notification::ManualChange {
                device: observed.name.clone(),
                target_temperature: observed.target_temperature,
            }),
            Self::Unchanged | Self::ChangedWhileLocked => None,
        }
    }
}
