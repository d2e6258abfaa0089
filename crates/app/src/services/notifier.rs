//! Best-effort delivery of notifications through the command channel.

use std::time::Duration;

use heatpilot_domain::error::Report;
use heatpilot_domain::notification::Notification;

use crate::ports::CommandChannel;
use crate::services::bounded;

/// Renders notifications with the cycle's outdoor temperature and sends
/// them. Failures are logged, never returned.
pub struct Notifier<'a, C> {
    channel: &'a C,
    outdoor_temperature: f64,
    timeout: Duration,
}

impl<'a, C: CommandChannel> Notifier<'a, C> {
    pub fn new(channel: &'a C, outdoor_temperature: f64, timeout: Duration) -> Self {
        Self {
            channel,
            outdoor_temperature,
            timeout,
        }
    }

    /// Send `notification`; returns whether the channel accepted it.
    pub async fn send(&self, notification: &Notification) -> bool {
        let text = notification.render(self.outdoor_temperature);
        match bounded(self.timeout, self.channel.send(&text)).await {
            Ok(()) => {
                tracing::debug!(%notification, "notification sent");
                true
            }
            Err(err) => {
                tracing::warn!(%notification, error = %Report(&err), "notification not delivered");
                false
            }
        }
    }
}
