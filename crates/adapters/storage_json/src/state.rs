//! JSON-file [`StateStore`].

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use heatpilot_app::ports::{PersistedState, StateStore};
use heatpilot_domain::error::HeatPilotError;

use crate::error::StorageError;

/// Device memory and global registry, one JSON file each.
///
/// A missing file loads as defaults. A file that is present but cannot be
/// parsed is logged and also loads as defaults; the next save replaces it.
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    memory_path: PathBuf,
    registry_path: PathBuf,
}

impl JsonStateStore {
    pub fn new(memory_path: impl Into<PathBuf>, registry_path: impl Into<PathBuf>) -> Self {
        Self {
            memory_path: memory_path.into(),
            registry_path: registry_path.into(),
        }
    }

    async fn read_all(&self) -> Result<PersistedState, StorageError> {
        Ok(PersistedState {
            memory: read_or_default(&self.memory_path).await?,
            registry: read_or_default(&self.registry_path).await?,
        })
    }

    async fn write_all(&self, state: &PersistedState) -> Result<(), StorageError> {
        write_replace(&self.memory_path, &state.memory).await?;
        write_replace(&self.registry_path, &state.registry).await?;
        tracing::debug!(devices = state.memory.len(), "state saved");
        Ok(())
    }
}

async fn read_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StorageError> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no state file yet");
            return Ok(T::default());
        }
        Err(err) => return Err(StorageError::io(path)(err)),
    };

    match serde_json::from_str(&text) {
        Ok(value) => Ok(value),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "unreadable state file, starting fresh");
            Ok(T::default())
        }
    }
}

/// Replace the file as a whole: write a sibling, then rename over it.
async fn write_replace<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(StorageError::io(parent))?;
    }

    let json = serde_json::to_vec_pretty(value)?;
    let staging = path.with_extension("json.tmp");
    tokio::fs::write(&staging, json)
        .await
        .map_err(StorageError::io(&staging))?;
    tokio::fs::rename(&staging, path)
        .await
        .map_err(StorageError::io(path))
}

impl StateStore for JsonStateStore {
    fn load(&self) -> impl Future<Output = Result<PersistedState, HeatPilotError>> + Send {
        async move { Ok(self.read_all().await?) }
    }

    fn save(
        &self,
        state: &PersistedState,
    ) -> impl Future<Output = Result<(), HeatPilotError>> + Send {
        async move { Ok(self.write_all(state).await?) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatpilot_domain::device::Device;
    use heatpilot_domain::memory::DeviceMemory;

    fn scratch() -> PathBuf {
        std::env::temp_dir().join(format!("heatpilot-state-{}", uuid::Uuid::new_v4()))
    }

    fn store(dir: &Path) -> JsonStateStore {
        JsonStateStore::new(dir.join("memory.json"), dir.join("registry.json"))
    }

    #[tokio::test]
    async fn should_load_defaults_when_files_are_missing() {
        let dir = scratch();
        let state = store(&dir).load().await.unwrap();
        assert_eq!(state, PersistedState::default());
    }

    #[tokio::test]
    async fn should_round_trip_state() {
        let dir = scratch();
        let store = store(&dir);
        let mut state = PersistedState::default();
        let salon = Device::builder()
            .name("Salón")
            .power(true)
            .target_temperature(22.5)
            .build()
            .unwrap();
        state.memory.entry(&salon).arm_lockout(1_000, 3_600);
        state.registry.stop_mode = true;
        state.registry.advance_cursor(812);

        store.save(&state).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded, state);
        assert!(!dir.join("memory.json.tmp").exists());
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn should_start_fresh_on_corrupt_file() {
        let dir = scratch();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("memory.json"), "{ not json").unwrap();
        std::fs::write(dir.join("registry.json"), r#"{"stop_mode": true}"#).unwrap();

        let state = store(&dir).load().await.unwrap();

        assert!(state.memory.is_empty());
        assert!(state.registry.stop_mode);
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn should_load_files_written_by_previous_deployment() {
        let dir = scratch();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("memory.json"),
            r#"{"Elisa": {"power": false, "target_temperature": 21.0, "bloqueo_hasta": 1736500000.5}}"#,
        )
        .unwrap();
        std::fs::write(
            dir.join("registry.json"),
            r#"{"last_telegram_update_id": 77, "stop_mode": false}"#,
        )
        .unwrap();

        let state = store(&dir).load().await.unwrap();

        assert_eq!(
            state.memory.get("Elisa"),
            Some(&DeviceMemory {
                power: false,
                target_temperature: 21.0,
                lockout_until: 1_736_500_000,
            })
        );
        assert_eq!(state.registry.last_processed_command_id, 77);
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[tokio::test]
    async fn should_fail_when_state_path_is_a_directory() {
        let dir = scratch();
        std::fs::create_dir_all(dir.join("memory.json")).unwrap();

        let result = store(&dir).load().await;

        assert!(matches!(result, Err(HeatPilotError::Storage(_))));
        std::fs::remove_dir_all(dir).unwrap();
    }
}
