//! Configuration loading — TOML file with environment variable overrides.
//!
//! Reads `heatpilot.toml` from the working directory, or the file named by
//! `HEATPILOT_CONFIG`. Every field has a sensible default so the file is
//! optional. Secrets usually come from the environment, which takes
//! precedence over file values.

use std::time::Duration;

use chrono_tz::Tz;
use serde::Deserialize;

use heatpilot_adapter_melcloud::MelCloudConfig;
use heatpilot_adapter_open_meteo::OpenMeteoConfig;
use heatpilot_adapter_storage_json::StorageConfig;
use heatpilot_adapter_telegram::TelegramConfig;
use heatpilot_adapter_virtual::VirtualConfig;
use heatpilot_app::services::control_cycle::CycleSettings;
use heatpilot_domain::error::HeatPilotError;
use heatpilot_domain::history::{HistoryColumn, default_columns};
use heatpilot_domain::policy::PolicyConstants;

const DEFAULT_PATH: &str = "heatpilot.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the outdoor temperature is read for.
    pub location: OpenMeteoConfig,
    pub timezone: TimezoneConfig,
    /// Control constants.
    pub policy: PolicyConstants,
    pub history: HistoryConfig,
    /// State and history file locations.
    pub storage: StorageConfig,
    pub http: HttpConfig,
    /// Which device registry to drive.
    pub registry: RegistryConfig,
    /// Operator command channel.
    pub telegram: TelegramConfig,
    pub logging: LoggingConfig,
}

/// Zone used for seasons, active hours and history timestamps.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TimezoneConfig {
    /// IANA zone name.
    pub name: String,
}

/// History columns, in file order.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub columns: Vec<HistoryColumn>,
}

/// Outbound HTTP settings shared by every adapter.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryKind {
    /// Real units through MELCloud, outdoor temperature from Open-Meteo.
    #[default]
    Melcloud,
    /// Simulated units and a fixed outdoor temperature.
    Virtual,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub kind: RegistryKind,
    pub melcloud: MelCloudConfig,
    #[serde(rename = "virtual")]
    pub simulated: VirtualConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from the config file (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is malformed, or if the
    /// result does not validate.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("HEATPILOT_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Apply overrides from `lookup`. When several names are listed the
    /// last one set wins: prefixed names beat the legacy ones and
    /// `HEATPILOT_LOG` beats `RUST_LOG`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |names: &[&str]| {
            names
                .iter()
                .rev()
                .find_map(|name| lookup(name).filter(|v| !v.is_empty()))
        };

        if let Some(val) = var(&["EMAIL", "MELCLOUD_EMAIL"]) {
            self.registry.melcloud.email = val;
        }
        if let Some(val) = var(&["PASSWORD", "MELCLOUD_PASSWORD"]) {
            self.registry.melcloud.password = val;
        }
        if let Some(val) = var(&["BOT_TOKEN", "TELEGRAM_BOT_TOKEN"]) {
            self.telegram.bot_token = val;
        }
        if let Some(val) = var(&["CHAT_ID", "TELEGRAM_CHAT_ID"]) {
            self.telegram.chat_id = val;
        }
        if let Some(val) = var(&["HEATPILOT_STATE_DIR"]) {
            self.storage.directory = val.into();
        }
        if let Some(val) = var(&["RUST_LOG", "HEATPILOT_LOG"]) {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.policy.validate().map_err(ConfigError::Policy)?;
        self.timezone()?;
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "http.timeout_secs must be non-zero".to_string(),
            ));
        }
        if !self.location.has_valid_coordinates() {
            return Err(ConfigError::Validation(format!(
                "location {}, {} is not on the globe",
                self.location.latitude, self.location.longitude
            )));
        }
        if self.telegram.is_enabled()
            && u64::from(self.telegram.poll_timeout_secs) >= self.http.timeout_secs
        {
            return Err(ConfigError::Validation(format!(
                "telegram.poll_timeout_secs ({}) must be shorter than http.timeout_secs ({})",
                self.telegram.poll_timeout_secs, self.http.timeout_secs
            )));
        }
        if self.registry.kind == RegistryKind::Melcloud && !self.registry.melcloud.has_credentials()
        {
            return Err(ConfigError::Validation(
                "MELCloud credentials missing, set MELCLOUD_EMAIL and MELCLOUD_PASSWORD".to_string(),
            ));
        }
        if let Some(column) = self.history.columns.iter().find(|c| c.label.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "history column for {} has no label",
                column.device
            )));
        }
        Ok(())
    }

    /// The configured time zone.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for an unknown zone name.
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .name
            .parse()
            .map_err(|_| ConfigError::Validation(format!("unknown time zone {}", self.timezone.name)))
    }

    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    /// Everything the control cycle needs besides its collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for an unknown time zone.
    pub fn cycle_settings(&self) -> Result<CycleSettings, ConfigError> {
        Ok(CycleSettings {
            policy: self.policy.clone(),
            timezone: self.timezone()?,
            history_columns: self.history.columns.clone(),
            call_timeout: self.call_timeout(),
        })
    }
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self {
            name: "Europe/Madrid".to_string(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            columns: default_columns(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 15 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "heatpilot=info,heatpilot_app=info,heatpilot_adapter_melcloud=info,heatpilot_adapter_telegram=info,warn".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Incoherent control constants.
    #[error("invalid policy")]
    Policy(#[source] HeatPilotError),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
