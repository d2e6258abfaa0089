//! Notifications — human-readable messages sent through the command channel.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::device::Device;
use crate::engine::Rule;

/// One line of the status report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub name: String,
    pub power: bool,
    pub target_temperature: f64,
}

impl From<&Device> for DeviceStatus {
    fn from(device: &Device) -> Self {
        Self {
            name: device.name.clone(),
            power: device.power,
            target_temperature: device.target_temperature,
        }
    }
}

/// Answer to the status directive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub active_hours: bool,
    pub stop_mode: bool,
    pub devices: Vec<DeviceStatus>,
}

/// Something worth telling the operator about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// A human changed the device out-of-band; a lockout was armed.
    ManualChange {
        device: String,
        target_temperature: f64,
    },
    /// The engine commanded a device.
    Action {
        rule: Rule,
        device: String,
        objective: Option<f64>,
    },
    LockoutsReset,
    StopEnabled,
    StopDisabled,
    Status(StatusReport),
    /// Advise raising the primary boiler by hand.
    BoilerAlert { threshold: f64, setpoint: f64 },
}

impl Notification {
    /// Render the message with the outdoor temperature appended.
    #[must_use]
    pub fn render(&self, outdoor_temperature: f64) -> String {
        format!("{self}\n\n🌡️ Outdoor: {outdoor_temperature:.1}°C")
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ManualChange {
                device,
                target_temperature,
            } => write!(
                f,
                "✋ MANUAL CHANGE: {device} set to {target_temperature:.1}°C"
            ),
            Self::Action {
                rule,
                device,
                objective,
            } => match (rule, objective) {
                (Rule::SafetyCutoff, _) => {
                    write!(f, "❄️ SAFETY: {device} switched off, extreme cold")
                }
                (Rule::SummerCutoff, _) => {
                    write!(f, "☀️ MILD: {device} switched off")
                }
                (Rule::StopMode, _) => write!(f, "🛑 STOP: {device} switched off"),
                (Rule::OutsideActiveHours, _) => {
                    write!(f, "🕒 NIGHT: {device} switched off")
                }
                (Rule::WinterComfort, Some(objective)) => {
                    write!(f, "🔥 SUPPORT: {device} heating to {objective:.1}°C")
                }
                (Rule::WinterComfort, None) => write!(f, "🔥 SUPPORT: {device} heating"),
                (Rule::NoAction, _) => write!(f, "{device} unchanged"),
            },
            Self::LockoutsReset => f.write_str("✅ Lockouts reset."),
            Self::StopEnabled => f.write_str("🛑 STOP mode enabled."),
            Self::StopDisabled => f.write_str("▶️ STOP mode disabled."),
            Self::Status(report) => {
                writeln!(f, "📊 STATUS")?;
                writeln!(
                    f,
                    "Active hours: {}",
                    if report.active_hours { "YES" } else { "NO" }
                )?;
                writeln!(f, "STOP: {}", report.stop_mode)?;
                for device in &report.devices {
                    writeln!(
                        f,
                        "• {}: {} ({:.1}°C)",
                        device.name,
                        if device.power { "ON" } else { "OFF" },
                        device.target_temperature
                    )?;
                }
                Ok(())
            }
            Self::BoilerAlert {
                threshold,
                setpoint,
            } => write!(
                f,
                "⚠️ ALERT: {threshold}°C or colder outside. Raise the boiler to {setpoint}°C by hand."
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_append_outdoor_temperature() {
        let text = Notification::StopEnabled.render(-3.5);
        assert_eq!(text, "🛑 STOP mode enabled.\n\n🌡️ Outdoor: -3.5°C");
    }

    #[test]
    fn should_render_whole_outdoor_temperature_with_one_decimal() {
        let text = Notification::LockoutsReset.render(8.0);
        assert!(text.ends_with("Outdoor: 8.0°C"));
    }

    #[test]
    fn should_describe_comfort_action_with_objective() {
        let n = Notification::Action {
            rule: Rule::WinterComfort,
            device: "Dormitorio".to_string(),
            objective: Some(21.0),
        };
        assert_eq!(n.to_string(), "🔥 SUPPORT: Dormitorio heating to 21.0°C");
    }

    #[test]
    fn should_describe_manual_change() {
        let n = Notification::ManualChange {
            device: "Salón".to_string(),
            target_temperature: 24.5,
        };
        assert!(n.to_string().contains("Salón set to 24.5°C"));
    }

    #[test]
    fn should_list_every_device_in_status() {
        let report = StatusReport {
            active_hours: true,
            stop_mode: false,
            devices: vec![
                DeviceStatus {
                    name: "Salón".to_string(),
                    power: true,
                    target_temperature: 22.5,
                },
                DeviceStatus {
                    name: "Elisa".to_string(),
                    power: false,
                    target_temperature: 21.0,
                },
            ],
        };
        let text = Notification::Status(report).to_string();
        assert!(text.contains("Active hours: YES"));
        assert!(text.contains("STOP: false"));
        assert!(text.contains("• Salón: ON (22.5°C)"));
        assert!(text.contains("• Elisa: OFF (21.0°C)"));
    }
}
