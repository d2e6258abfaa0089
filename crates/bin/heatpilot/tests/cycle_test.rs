//! End-to-end tests for a full control cycle.
//!
//! Each test wires the real application service with the virtual registry
//! and weather, a disabled Telegram channel and the JSON/CSV file stores in
//! a scratch directory. Consecutive runs share the files and the simulated
//! units, the way consecutive process invocations share disk and hardware.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use heatpilot_adapter_storage_json::StorageConfig;
use heatpilot_adapter_telegram::{TelegramChannel, TelegramConfig};
use heatpilot_adapter_virtual::{UnitSpec, VirtualRegistry, VirtualWeather};
use heatpilot_app::ports::StateStore;
use heatpilot_app::services::control_cycle::{ControlCycle, CycleReport, CycleSettings, DeviceOutcome};
use heatpilot_domain::engine::Rule;
use heatpilot_domain::history::default_columns;
use heatpilot_domain::policy::PolicyConstants;

struct House {
    units: Vec<UnitSpec>,
    storage: StorageConfig,
    registry: Arc<VirtualRegistry>,
}

impl House {
    fn new(units: &[UnitSpec]) -> Self {
        let directory: PathBuf =
            std::env::temp_dir().join(format!("heatpilot-e2e-{}", uuid::Uuid::new_v4()));
        Self {
            units: units.to_vec(),
            storage: StorageConfig {
                directory,
                ..StorageConfig::default()
            },
            registry: Arc::new(VirtualRegistry::new(units).unwrap()),
        }
    }

    async fn run(&self, outdoor: f64, now: DateTime<Utc>) -> CycleReport {
        let settings = CycleSettings {
            policy: PolicyConstants::default(),
            timezone: chrono_tz::Europe::Madrid,
            history_columns: default_columns(),
            call_timeout: Duration::from_secs(5),
        };
        let channel = TelegramChannel::new(TelegramConfig::default(), settings.call_timeout).unwrap();
        ControlCycle::new(
            VirtualWeather::new(outdoor),
            Arc::clone(&self.registry),
            channel,
            self.storage.state_store(),
            self.storage.history_log(),
            settings,
        )
        .run(now)
        .await
        .unwrap()
    }

    /// Rebuild the units from configuration, as a new process would.
    async fn restart(&mut self) {
        let state = self.storage.state_store().load().await.unwrap();
        self.registry = Arc::new(VirtualRegistry::resume(&self.units, &state.memory).unwrap());
    }

    fn history(&self) -> String {
        std::fs::read_to_string(self.storage.history_path()).unwrap()
    }
}

impl Drop for House {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.storage.directory);
    }
}

/// 11:00 in Madrid.
fn winter_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap()
}

fn rooms() -> Vec<UnitSpec> {
    vec![
        UnitSpec::new("Salón", false, 20.0),
        UnitSpec::new("Dormitorio", false, 18.0),
        UnitSpec::new("Jimena", true, 19.0),
        UnitSpec::new("Elisa", false, 19.0),
    ]
}

#[tokio::test]
async fn should_heat_every_room_on_a_cold_morning() {
    let house = House::new(&rooms());

    let report = house.run(8.0, winter_morning()).await;

    assert_eq!(report.commands_applied(), 4);
    for name in ["Salón", "Dormitorio", "Jimena", "Elisa"] {
        let unit = house.registry.unit(name).unwrap().snapshot();
        assert!(unit.power, "{name} should be on");
    }
    assert!((house.registry.unit("Salón").unwrap().snapshot().target_temperature - 22.5).abs() < 1e-9);
}

#[tokio::test]
async fn should_persist_memory_and_history_between_runs() {
    let house = House::new(&rooms());

    house.run(8.0, winter_morning()).await;
    let second = house.run(8.5, winter_morning() + chrono::Duration::minutes(10)).await;

    assert_eq!(second.commands_applied(), 0);
    assert!(second.devices.iter().all(|d| !d.manual_change));

    let state = house.storage.state_store().load().await.unwrap();
    assert_eq!(state.memory.len(), 4);
    assert!(state.memory.get("Elisa").unwrap().power);

    let history = house.history();
    let lines: Vec<&str> = history.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "date,outdoor_temp,salon_on,dorm_on,jimena_on,elisa_on");
    assert_eq!(lines[1], "2025-01-15 11:00,8.0,1,1,1,1");
    assert_eq!(lines[2], "2025-01-15 11:10,8.5,1,1,1,1");
}

#[tokio::test]
async fn should_not_mistake_restarted_units_for_manual_changes() {
    let mut house = House::new(&rooms());
    let t0 = winter_morning();

    let first = house.run(8.0, t0).await;
    assert_eq!(first.commands_applied(), 4);

    house.restart().await;
    let second = house.run(8.0, t0 + chrono::Duration::minutes(10)).await;

    assert!(second.devices.iter().all(|d| !d.manual_change));
    assert_eq!(second.commands_applied(), 0);
    assert!(second.devices.iter().all(|d| matches!(
        d.outcome,
        DeviceOutcome::Settled {
            rule: Rule::WinterComfort
        }
    )));
}

#[tokio::test]
async fn should_respect_manual_change_across_runs() {
    let house = House::new(&rooms());
    let t0 = winter_morning();

    house.run(8.0, t0).await;
    house.registry.unit("Salón").unwrap().set_by_hand(false, 22.5);

    let report = house.run(8.0, t0 + chrono::Duration::minutes(10)).await;
    let salon = report.device("Salón").unwrap();
    assert!(salon.manual_change);
    assert!(matches!(salon.outcome, DeviceOutcome::Locked { .. }));
    assert!(!house.registry.unit("Salón").unwrap().snapshot().power);

    let report = house.run(8.0, t0 + chrono::Duration::minutes(20)).await;
    assert!(matches!(
        report.device("Salón").unwrap().outcome,
        DeviceOutcome::Locked { .. }
    ));

    let report = house.run(8.0, t0 + chrono::Duration::minutes(75)).await;
    assert_eq!(
        report.device("Salón").unwrap().outcome,
        DeviceOutcome::Commanded {
            rule: Rule::WinterComfort,
            command: heatpilot_domain::device::DeviceCommand::heat_to(22.5),
        }
    );
    assert!(house.registry.unit("Salón").unwrap().snapshot().power);
}

#[tokio::test]
async fn should_honour_persisted_stop_mode() {
    let house = House::new(&rooms());
    std::fs::create_dir_all(&house.storage.directory).unwrap();
    std::fs::write(
        house.storage.registry_path(),
        r#"{"last_processed_command_id": 3, "stop_mode": true}"#,
    )
    .unwrap();

    let report = house.run(8.0, winter_morning()).await;

    assert_eq!(
        report.device("Jimena").unwrap().outcome,
        DeviceOutcome::Commanded {
            rule: Rule::StopMode,
            command: heatpilot_domain::device::DeviceCommand::power_off(),
        }
    );
    assert_eq!(
        report.device("Salón").unwrap().outcome,
        DeviceOutcome::Settled {
            rule: Rule::StopMode
        }
    );
    let state = house.storage.state_store().load().await.unwrap();
    assert!(state.registry.stop_mode);
    assert_eq!(state.registry.last_processed_command_id, 3);
}

#[tokio::test]
async fn should_recover_from_corrupt_memory_file() {
    let house = House::new(&rooms());
    std::fs::create_dir_all(&house.storage.directory).unwrap();
    std::fs::write(house.storage.memory_path(), "{{{{").unwrap();

    let report = house.run(25.0, winter_morning()).await;

    assert_eq!(report.devices.len(), 4);
    let state = house.storage.state_store().load().await.unwrap();
    assert_eq!(state.memory.len(), 4);
}

#[tokio::test]
async fn should_switch_everything_off_at_night() {
    let units = vec![
        UnitSpec::new("Salón", true, 22.5),
        UnitSpec::new("Elisa", true, 21.0),
    ];
    let house = House::new(&units);
    let midnight = Utc.with_ymd_and_hms(2025, 1, 15, 23, 30, 0).unwrap();

    let report = house.run(6.0, midnight).await;

    assert!(report.devices.iter().all(|d| matches!(
        d.outcome,
        DeviceOutcome::Commanded {
            rule: Rule::OutsideActiveHours,
            ..
        }
    )));
    assert!(house.history().ends_with("2025-01-16 00:30,6.0,0,0,0,0\n"));
}
