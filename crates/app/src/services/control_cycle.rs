//! Control cycle — one complete reconcile pass over every device.
//!
//! Order of work: outdoor temperature → persisted state → boiler advisory →
//! device list → concurrent refresh → operator directives → per-device
//! decision and command → save state → history row.
//!
//! Only three failures abort the cycle: no outdoor temperature, unreadable
//! state, or no device list. All of them happen before any device is
//! touched or any state is written. Everything after that is per-call:
//! logged, and the affected device is simply left for the next cycle.

use std::time::Duration;

use chrono_tz::Tz;
use futures::future::join_all;

use heatpilot_domain::device::{Device, DeviceCommand};
use heatpilot_domain::engine::{self, Outcome, Rule};
use heatpilot_domain::error::{HeatPilotError, Report};
use heatpilot_domain::history::{HistoryColumn, HistoryRow};
use heatpilot_domain::memory::MemoryStore;
use heatpilot_domain::notification::Notification;
use heatpilot_domain::policy::{Conditions, PolicyConstants};
use heatpilot_domain::time::{Timestamp, to_local};

use crate::ports::{CommandChannel, DeviceRegistry, HistoryLog, StateStore, WeatherSource};
use crate::services::bounded;
use crate::services::command_processor::CommandProcessor;
use crate::services::notifier::Notifier;

/// Static inputs of every cycle.
#[derive(Debug, Clone)]
pub struct CycleSettings {
    pub policy: PolicyConstants,
    /// Zone used for season, active hours and history timestamps.
    pub timezone: Tz,
    pub history_columns: Vec<HistoryColumn>,
    /// Upper bound for every call to a remote collaborator.
    pub call_timeout: Duration,
}

/// A failure that makes the whole cycle unsafe to continue.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("outdoor temperature unavailable")]
    Weather(#[source] HeatPilotError),

    #[error("persisted state could not be loaded")]
    LoadState(#[source] HeatPilotError),

    #[error("device list unavailable")]
    ListDevices(#[source] HeatPilotError),
}

/// What happened to one device.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceOutcome {
    /// The device could not be refreshed; nothing was decided.
    Unreachable,
    /// Under manual lockout until the given epoch second.
    Locked { until: i64 },
    /// A rule matched but the device already was where it should be.
    Settled { rule: Rule },
    Commanded { rule: Rule, command: DeviceCommand },
    /// The device refused or did not answer; memory was not advanced.
    CommandFailed { rule: Rule, command: DeviceCommand },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceReport {
    pub name: String,
    /// A manual change was detected and a lockout armed this cycle.
    pub manual_change: bool,
    pub outcome: DeviceOutcome,
}

/// Summary of a completed cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub outdoor_temperature: f64,
    pub devices: Vec<DeviceReport>,
}

impl CycleReport {
    /// Report for the named device, if it was listed.
    #[must_use]
    pub fn device(&self, name: &str) -> Option<&DeviceReport> {
        self.devices.iter().find(|d| d.name == name)
    }

    /// Number of commands the devices accepted.
    #[must_use]
    pub fn commands_applied(&self) -> usize {
        self.devices
            .iter()
            .filter(|d| matches!(d.outcome, DeviceOutcome::Commanded { .. }))
            .count()
    }
}

/// Runs one control cycle against injected ports.
pub struct ControlCycle<W, R, C, S, H> {
    weather: W,
    registry: R,
    channel: C,
    store: S,
    history: H,
    settings: CycleSettings,
}

impl<W, R, C, S, H> ControlCycle<W, R, C, S, H>
where
    W: WeatherSource,
    R: DeviceRegistry,
    C: CommandChannel,
    S: StateStore,
    H: HistoryLog,
{
    pub fn new(weather: W, registry: R, channel: C, store: S, history: H, settings: CycleSettings) -> Self {
        Self {
            weather,
            registry,
            channel,
            store,
            history,
            settings,
        }
    }

    /// Run a full cycle as of `now`.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError`] when the outdoor temperature, the persisted
    /// state or the device list cannot be obtained. In that case no device
    /// was commanded and nothing was written.
    #[tracing::instrument(skip_all, fields(now = %now))]
    pub async fn run(&self, now: Timestamp) -> Result<CycleReport, CycleError> {
        let timeout = self.settings.call_timeout;
        let policy = &self.settings.policy;

        let outdoor = bounded(timeout, self.weather.current_temperature())
            .await
            .map_err(CycleError::Weather)?;
        tracing::info!(outdoor, "outdoor temperature");

        let mut state = self.store.load().await.map_err(CycleError::LoadState)?;

        let local = to_local(now, self.settings.timezone);
        let mut conditions = Conditions::at(&local, outdoor, state.registry.stop_mode, policy);
        let notifier = Notifier::new(&self.channel, outdoor, timeout);

        if conditions.boiler_alert_due(&policy.boiler_alert) {
            tracing::warn!(
                setpoint = policy.boiler_alert.setpoint,
                "cold outside, suggesting a higher boiler setpoint"
            );
            notifier
                .send(&Notification::BoilerAlert {
                    threshold: policy.boiler_alert.threshold,
                    setpoint: policy.boiler_alert.setpoint,
                })
                .await;
        }

        let listed = bounded(timeout, self.registry.list_devices())
            .await
            .map_err(CycleError::ListDevices)?;
        let (mut devices, unreachable) = self.refresh_all(listed).await;

        CommandProcessor::new(&self.channel, outdoor, timeout)
            .process(&mut state, &devices, conditions.active_hours)
            .await;
        conditions.stop_mode = state.registry.stop_mode;

        tracing::info!(
            season = %conditions.season,
            active_hours = conditions.active_hours,
            stop_mode = conditions.stop_mode,
            "conditions"
        );

        let mut reports = Vec::with_capacity(devices.len() + unreachable.len());
        for device in &mut devices {
            let report = self
                .reconcile(device, &mut state.memory, &conditions, &notifier)
                .await;
            reports.push(report);
        }
        reports.extend(unreachable.into_iter().map(|name| DeviceReport {
            name,
            manual_change: false,
            outcome: DeviceOutcome::Unreachable,
        }));

        if let Err(err) = self.store.save(&state).await {
            tracing::error!(error = %Report(&err), "could not persist state");
        }

        let columns = &self.settings.history_columns;
        let row = HistoryRow::new(&local, outdoor, &devices, columns);
        if let Err(err) = self.history.append(&row, columns).await {
            tracing::error!(error = %Report(&err), "could not append history row");
        }

        Ok(CycleReport {
            outdoor_temperature: outdoor,
            devices: reports,
        })
    }

    /// Refresh every listed device concurrently. Returns the refreshed
    /// devices and the names of those that could not be refreshed.
    async fn refresh_all(&self, listed: Vec<Device>) -> (Vec<Device>, Vec<String>) {
        let timeout = self.settings.call_timeout;
        let mut pending = Vec::with_capacity(listed.len());
        for device in &listed {
            pending.push(bounded(timeout, self.registry.refresh(device)));
        }
        let results = join_all(pending).await;

        let mut refreshed = Vec::with_capacity(listed.len());
        let mut unreachable = Vec::new();
        for (device, result) in listed.into_iter().zip(results) {
            match result {
                Ok(fresh) => refreshed.push(fresh),
                Err(err) => {
                    tracing::error!(device = %device.name, error = %Report(&err), "refresh failed");
                    unreachable.push(device.name);
                }
            }
        }
        (refreshed, unreachable)
    }

    /// Decide and act for one device. Notifications for the same device
    /// are sent in order.
    async fn reconcile(
        &self,
        device: &mut Device,
        memories: &mut MemoryStore,
        conditions: &Conditions,
        notifier: &Notifier<'_, C>,
    ) -> DeviceReport {
        let policy = &self.settings.policy;
        let memory = memories.entry(device);

        tracing::info!(
            device = %device.name,
            power = device.power,
            target = device.target_temperature,
            objective = policy.objective_for(&device.name),
            "observed"
        );

        let evaluation = engine::evaluate(memory, device, conditions, policy);
        let manual_change = evaluation.override_check.notification(device);
        let mut report = DeviceReport {
            name: device.name.clone(),
            manual_change: manual_change.is_some(),
            outcome: DeviceOutcome::Unreachable,
        };

        if let Some(notification) = manual_change {
            tracing::info!(device = %device.name, until = memory.lockout_until, "manual change detected");
            notifier.send(&notification).await;
        }

        let verdict = match evaluation.outcome {
            Outcome::Locked { until } => {
                tracing::info!(device = %device.name, until, "under manual lockout");
                report.outcome = DeviceOutcome::Locked { until };
                return report;
            }
            Outcome::Decided(verdict) => verdict,
        };

        let Some(command) = verdict.command else {
            tracing::debug!(device = %device.name, rule = %verdict.rule, "nothing to do");
            report.outcome = DeviceOutcome::Settled { rule: verdict.rule };
            return report;
        };

        let rule = verdict.rule;
        match bounded(self.settings.call_timeout, self.registry.apply(device, &command)).await {
            Ok(()) => {
                tracing::info!(device = %device.name, %rule, %command, "command applied");
                memory.record(&command);
                device.apply(&command);
                if let Some(notification) = verdict.notification(&device.name) {
                    notifier.send(&notification).await;
                }
                report.outcome = DeviceOutcome::Commanded { rule, command };
            }
            Err(err) => {
                tracing::error!(
                    device = %device.name,
                    %rule,
                    %command,
                    error = %Report(&err),
                    "command failed"
                );
                report.outcome = DeviceOutcome::CommandFailed { rule, command };
            }
        }
        report
    }
}
