//! Editor configuration.

use std::time::Duration;

use flowdraft_store::{DEFAULT_KEY, DEFAULT_MAX_BYTES, KvStore, SnapshotStore};
use serde::{Deserialize, Serialize};

/// Timings and storage limits for an editor session.
///
/// Every field has a default, so a config file only needs the values it
/// overrides:
///
/// ```json
/// { "autosave_debounce_ms": 5000, "storage_key": "my-workflow" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
  /// Quiescence window before re-validating after an edit.
  pub validation_debounce_ms: u64,
  /// Quiescence window before attempting an auto-save after an edit.
  pub autosave_debounce_ms: u64,
  /// How long the `saved` status is shown before decaying to `idle`.
  pub saved_display_ms: u64,
  /// How long the `error` status is shown before decaying to `idle`.
  pub error_display_ms: u64,
  /// Upper bound on any single storage operation.
  pub storage_timeout_ms: u64,
  pub storage_key: String,
  pub max_snapshot_bytes: usize,
}

impl Default for EditorConfig {
  fn default() -> Self {
    Self {
      validation_debounce_ms: 1_000,
      autosave_debounce_ms: 2_000,
      saved_display_ms: 2_000,
      error_display_ms: 3_000,
      storage_timeout_ms: 5_000,
      storage_key: DEFAULT_KEY.to_string(),
      max_snapshot_bytes: DEFAULT_MAX_BYTES,
    }
  }
}

impl EditorConfig {
  pub fn validation_debounce(&self) -> Duration {
    Duration::from_millis(self.validation_debounce_ms)
  }

  pub fn autosave_debounce(&self) -> Duration {
    Duration::from_millis(self.autosave_debounce_ms)
  }

  pub fn saved_display(&self) -> Duration {
    Duration::from_millis(self.saved_display_ms)
  }

  pub fn error_display(&self) -> Duration {
    Duration::from_millis(self.error_display_ms)
  }

  pub fn storage_timeout(&self) -> Duration {
    Duration::from_millis(self.storage_timeout_ms)
  }

  /// Wrap a backend in a snapshot store configured from these settings.
  pub fn snapshot_store<S: KvStore>(&self, kv: S) -> SnapshotStore<S> {
    SnapshotStore::new(kv)
      .with_key(self.storage_key.clone())
      .with_max_bytes(self.max_snapshot_bytes)
      .with_timeout(self.storage_timeout())
  }
}
