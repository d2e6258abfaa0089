//! Telegram bot configuration.

use std::fmt;

use serde::Deserialize;

/// Configuration for the Telegram command channel.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token. Usually supplied through `TELEGRAM_BOT_TOKEN`.
    pub bot_token: String,
    /// The only chat whose messages are interpreted, and where replies go.
    pub chat_id: String,
    /// Bot API root, without trailing slash.
    pub base_url: String,
    /// Long-poll wait passed to `getUpdates`, in seconds.
    pub poll_timeout_secs: u16,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            base_url: "https://api.telegram.org".to_string(),
            poll_timeout_secs: 5,
        }
    }
}

impl TelegramConfig {
    /// Both a token and a chat are configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("base_url", &self.base_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_be_disabled_by_default() {
        let config = TelegramConfig::default();
        assert!(!config.is_enabled());
        assert_eq!(config.base_url, "https://api.telegram.org");
        assert_eq!(config.poll_timeout_secs, 5);
    }

    #[test]
    fn should_deserialize_from_toml() {
        let toml = r#"
            bot_token = "123:abc"
            chat_id = "-100200300"
        "#;
        let config: TelegramConfig = toml::from_str(toml).unwrap();
        assert!(config.is_enabled());
        assert_eq!(config.chat_id, "-100200300");
    }

    #[test]
    fn should_not_print_token() {
        let config = TelegramConfig {
            bot_token: "123:abc".to_string(),
            ..TelegramConfig::default()
        };
        assert!(!format!("{config:?}").contains("123:abc"));
    }
}
