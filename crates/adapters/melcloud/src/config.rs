//! MELCloud account configuration.

use std::fmt;

use serde::Deserialize;

/// Credentials and endpoint for the MELCloud account.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct MelCloudConfig {
    /// Account e-mail. Usually supplied through `MELCLOUD_EMAIL`.
    pub email: String,
    /// Account password. Usually supplied through `MELCLOUD_PASSWORD`.
    pub password: String,
    /// API root, without trailing slash.
    pub base_url: String,
    /// Client version announced at login.
    pub app_version: String,
    /// MELCloud language index (0 = English).
    pub language: u8,
}

impl Default for MelCloudConfig {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            base_url: "https://app.melcloud.com/Mitsubishi.Wifi.Client".to_string(),
            app_version: "1.19.1.1".to_string(),
            language: 0,
        }
    }
}

impl MelCloudConfig {
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.email.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for MelCloudConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MelCloudConfig")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("app_version", &self.app_version)
            .field("language", &self.language)
            .finish()
    }
}
