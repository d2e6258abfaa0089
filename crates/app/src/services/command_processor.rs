//! Command processor — applies operator directives received since the
//! last cycle.

use std::time::Duration;

use heatpilot_domain::device::Device;
use heatpilot_domain::directive::Directive;
use heatpilot_domain::error::Report;
use heatpilot_domain::notification::{DeviceStatus, Notification, StatusReport};

use crate::ports::{CommandChannel, PersistedState};
use crate::services::bounded;
use crate::services::notifier::Notifier;

/// Polls the command channel and applies directives to persisted state.
///
/// Inbound commands are best-effort: a failed poll is logged and the cycle
/// carries on with unchanged state.
pub struct CommandProcessor<'a, C> {
    channel: &'a C,
    notifier: Notifier<'a, C>,
    timeout: Duration,
}

impl<'a, C: CommandChannel> CommandProcessor<'a, C> {
    pub fn new(channel: &'a C, outdoor_temperature: f64, timeout: Duration) -> Self {
        Self {
            channel,
            notifier: Notifier::new(channel, outdoor_temperature, timeout),
            timeout,
        }
    }

    /// Apply every directive received after the stored cursor.
    ///
    /// The cursor advances past every polled message, recognised or not.
    /// Returns the directives applied, in order.
    #[tracing::instrument(skip_all, fields(since = state.registry.last_processed_command_id))]
    pub async fn process(
        &self,
        state: &mut PersistedState,
        devices: &[Device],
        active_hours: bool,
    ) -> Vec<Directive> {
        let since = state.registry.last_processed_command_id;
        let messages = match bounded(self.timeout, self.channel.poll(since)).await {
            Ok(messages) => messages,
            Err(err) => {
                tracing::warn!(error = %Report(&err), "could not poll operator commands");
                return Vec::new();
            }
        };

        let mut applied = Vec::new();
        for message in messages {
            state.registry.advance_cursor(message.id);

            let directives = Directive::parse_all(&message.text);
            if directives.is_empty() {
                tracing::debug!(id = message.id, "ignoring unrecognised message");
                continue;
            }

            for directive in directives {
                tracing::info!(id = message.id, %directive, "applying operator directive");
                let reply = apply(directive, state, devices, active_hours);
                self.notifier.send(&reply).await;
                applied.push(directive);
            }
        }
        applied
    }
}

fn apply(
    directive: Directive,
    state: &mut PersistedState,
    devices: &[Device],
    active_hours: bool,
) -> Notification {
    match directive {
        Directive::ResetLockouts => {
            state.memory.reset_lockouts();
            Notification::LockoutsReset
        }
        Directive::Stop => {
            state.registry.stop_mode = true;
            Notification::StopEnabled
        }
        Directive::Resume => {
            state.registry.stop_mode = false;
            Notification::StopDisabled
        }
        Directive::Status => Notification::Status(StatusReport {
            active_hours,
            stop_mode: state.registry.stop_mode,
            devices: devices.iter().map(DeviceStatus::from).collect(),
        }),
    }
}
