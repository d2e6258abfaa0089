//! Command channel port — operator messages in, notifications out.

use std::future::Future;

use heatpilot_domain::error::HeatPilotError;

/// A message received from the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Strictly increasing id assigned by the channel.
    pub id: i64,
    pub text: String,
}

impl InboundMessage {
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// Bidirectional chat with the operator.
pub trait CommandChannel {
    /// Messages with an id greater than `since_id`, oldest first.
    fn poll(
        &self,
        since_id: i64,
    ) -> impl Future<Output = Result<Vec<InboundMessage>, HeatPilotError>> + Send;

    /// Deliver a notification.
    fn send(&self, text: &str) -> impl Future<Output = Result<(), HeatPilotError>> + Send;
}

impl<T: CommandChannel + Send + Sync> CommandChannel for std::sync::Arc<T> {
    fn poll(
        &self,
        since_id: i64,
    ) -> impl Future<Output = Result<Vec<InboundMessage>, HeatPilotError>> + Send {
        (**self).poll(since_id)
    }

    fn send(&self, text: &str) -> impl Future<Output = Result<(), HeatPilotError>> + Send {
        (**self).send(text)
    }
}
