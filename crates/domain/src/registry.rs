//! Global registry — process-wide state that survives between cycles.

use serde::{Deserialize, Serialize};

/// Command cursor and stop flag, persisted alongside device memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalRegistry {
    /// Highest inbound command id already handled.
    #[serde(alias = "last_telegram_update_id")]
    pub last_processed_command_id: i64,
    /// When set, every device is forced off (after the safety/summer rules).
    pub stop_mode: bool,
}

impl GlobalRegistry {
    /// Move the cursor forward to `id`. Older ids are ignored.
    pub fn advance_cursor(&mut self, id: i64) {
        self.last_processed_command_id = self.last_processed_command_id.max(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_zero_cursor_and_running() {
        let registry = GlobalRegistry::default();
        assert_eq!(registry.last_processed_command_id, 0);
        assert!(!registry.stop_mode);
    }

    #[test]
    fn should_only_advance_cursor_forwards() {
        let mut registry = GlobalRegistry::default();
        registry.advance_cursor(10);
        registry.advance_cursor(7);
        assert_eq!(registry.last_processed_command_id, 10);
    }

    #[test]
    fn should_fill_missing_fields_with_defaults() {
        let registry: GlobalRegistry = serde_json::from_str(r#"{"stop_mode": true}"#).unwrap();
        assert!(registry.stop_mode);
        assert_eq!(registry.last_processed_command_id, 0);
    }

    #[test]
    fn should_read_cursor_from_legacy_key() {
        let registry: GlobalRegistry =
            serde_json::from_str(r#"{"last_telegram_update_id": 812, "stop_mode": false}"#)
                .unwrap();
        assert_eq!(registry.last_processed_command_id, 812);
    }
}
