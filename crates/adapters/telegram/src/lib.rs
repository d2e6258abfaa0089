//! # heatpilot-adapter-telegram
//!
//! [`CommandChannel`] backed by the Telegram Bot API.
//!
//! - `poll(since)` → `getUpdates?offset={since + 1}&timeout=..`
//! - `send(text)` → `sendMessage` to the configured chat
//!
//! Updates from any other chat keep their id, so the cursor moves past
//! them, but their text is dropped and never interpreted. Without a token
//! or chat id the channel is disabled: polls return nothing and sends are
//! discarded.
//!
//! ## Dependency rule
//!
//! Depends on `heatpilot-app` (port traits) and `heatpilot-domain` only.

pub mod config;
pub mod error;

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;

use heatpilot_app::ports::{CommandChannel, InboundMessage};
use heatpilot_domain::error::HeatPilotError;

pub use config::TelegramConfig;
pub use error::TelegramError;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

impl<T> ApiResponse<T> {
    fn into_result(self) -> Result<Option<T>, TelegramError> {
        if self.ok {
            Ok(self.result)
        } else {
            Err(TelegramError::Api(
                self.description
                    .unwrap_or_else(|| "no description".to_string()),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    #[serde(default)]
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

impl Update {
    fn into_inbound(self, chat_id: &str) -> InboundMessage {
        let text = self
            .message
            .filter(|message| message.chat.id.to_string() == chat_id)
            .and_then(|message| message.text)
            .unwrap_or_default();
        InboundMessage::new(self.update_id, text)
    }
}

/// Telegram chat used as the operator command channel.
pub struct TelegramChannel {
    client: Option<reqwest::Client>,
    config: TelegramConfig,
}

impl TelegramChannel {
    /// Build the channel. Returns a disabled channel when the bot token or
    /// chat id is missing.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError::Http`] if the HTTP client cannot be built.
    pub fn new(config: TelegramConfig, timeout: Duration) -> Result<Self, TelegramError> {
        let client = if config.is_enabled() {
            Some(reqwest::Client::builder().timeout(timeout).build()?)
        } else {
            tracing::info!("telegram not configured, command channel disabled");
            None
        };
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    fn url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{method}",
            self.config.base_url.trim_end_matches('/'),
            self.config.bot_token
        )
    }

    async fn updates(&self, since_id: i64) -> Result<Vec<InboundMessage>, TelegramError> {
        let Some(client) = &self.client else {
            return Ok(Vec::new());
        };

        let response: ApiResponse<Vec<Update>> = client
            .get(self.url("getUpdates"))
            .query(&[
                ("offset", (since_id + 1).to_string()),
                ("timeout", self.config.poll_timeout_secs.to_string()),
            ])
            .send()
            .await?
            .json()
            .await?;

        let updates = response.into_result()?.unwrap_or_default();
        tracing::debug!(count = updates.len(), "telegram updates");
        Ok(updates
            .into_iter()
            .map(|update| update.into_inbound(&self.config.chat_id))
            .collect())
    }

    async fn send_message(&self, text: &str) -> Result<(), TelegramError> {
        let Some(client) = &self.client else {
            tracing::debug!("telegram disabled, dropping message");
            return Ok(());
        };

        let response: ApiResponse<serde_json::Value> = client
            .post(self.url("sendMessage"))
            .json(&serde_json::json!({
                "chat_id": self.config.chat_id,
                "text": text,
            }))
            .send()
            .await?
            .json()
            .await?;
        response.into_result()?;
        Ok(())
    }
}

impl CommandChannel for TelegramChannel {
    fn poll(
        &self,
        since_id: i64,
    ) -> impl Future<Output = Result<Vec<InboundMessage>, HeatPilotError>> + Send {
        async move { self.updates(since_id).await.map_err(TelegramError::into_domain) }
    }

    fn send(&self, text: &str) -> impl Future<Output = Result<(), HeatPilotError>> + Send {
        async move { self.send_message(text).await.map_err(TelegramError::into_domain) }
    }
}
