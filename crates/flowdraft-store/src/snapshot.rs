//! Single-slot snapshot persistence.

use std::future::Future;
use std::time::Duration;

use flowdraft_config::Snapshot;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{KvError, StoreError};
use crate::kv::KvStore;

/// Key of the auto-save slot.
pub const DEFAULT_KEY: &str = "workflow-autosave";

/// Largest serialized snapshot the slot accepts (5 MiB).
pub const DEFAULT_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Upper bound on any single storage operation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A single-slot store of workflow snapshots.
///
/// Every write fully replaces the previous record (last write wins, no
/// history). Reads never surface storage or decoding failures: an unreadable
/// backend reads as "no saved data", and a corrupt record is erased.
///
/// The backend sits behind an async mutex so that one write runs to
/// completion before the next storage operation starts.
pub struct SnapshotStore<S: KvStore> {
  kv: Mutex<S>,
  key: String,
  max_bytes: usize,
  timeout: Duration,
}

impl<S: KvStore> SnapshotStore<S> {
  pub fn new(kv: S) -> Self {
    Self {
      kv: Mutex::new(kv),
      key: DEFAULT_KEY.to_string(),
      max_bytes: DEFAULT_MAX_BYTES,
      timeout: DEFAULT_TIMEOUT,
    }
  }

  pub fn with_key(mut self, key: impl Into<String>) -> Self {
    self.key = key.into();
    self
  }

  pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
    self.max_bytes = max_bytes;
    self
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn key(&self) -> &str {
    &self.key
  }

  pub fn max_bytes(&self) -> usize {
    self.max_bytes
  }

  /// Serialize and store a snapshot, replacing whatever the slot held.
  ///
  /// The size ceiling is checked before touching the backend, so a rejected
  /// snapshot leaves the previous record in place.
  pub async fn write(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
    let serialized = serde_json::to_string(snapshot)?;
    if serialized.len() > self.max_bytes {
      return Err(StoreError::CapacityExceeded {
        size: serialized.len(),
        limit: self.max_bytes,
      });
    }

    let size = serialized.len();
    let mut kv = self.kv.lock().await;
    self.bounded("write", kv.set(&self.key, serialized)).await?;
    debug!(key = %self.key, bytes = size, "wrote auto-save snapshot");
    Ok(())
  }

  /// Read the stored snapshot, if there is a usable one.
  pub async fn read(&self) -> Option<Snapshot> {
    let mut kv = self.kv.lock().await;
    let text = match self.bounded("read", kv.get(&self.key)).await {
      Ok(Some(text)) => text,
      Ok(None) => return None,
      Err(e) => {
        warn!(key = %self.key, error = %e, "failed to read auto-save slot");
        return None;
      }
    };

    match decode(&text) {
      Ok(snapshot) => Some(snapshot),
      Err(e) => {
        warn!(key = %self.key, error = %e, "erasing corrupt auto-save record");
        if let Err(e) = self.bounded("delete", kv.delete(&self.key)).await {
          warn!(key = %self.key, error = %e, "failed to erase corrupt auto-save record");
        }
        None
      }
    }
  }

  /// Remove the stored record. Clearing an empty slot is a no-op.
  pub async fn clear(&self) {
    let mut kv = self.kv.lock().await;
    match self.bounded("delete", kv.delete(&self.key)).await {
      Ok(()) => debug!(key = %self.key, "cleared auto-save slot"),
      Err(e) => warn!(key = %self.key, error = %e, "failed to clear auto-save slot"),
    }
  }

  /// Whether the slot holds anything. Storage failures report `false`.
  pub async fn exists(&self) -> bool {
    let kv = self.kv.lock().await;
    match self.bounded("read", kv.get(&self.key)).await {
      Ok(value) => value.is_some_and(|v| !v.is_empty()),
      Err(e) => {
        warn!(key = %self.key, error = %e, "failed to access auto-save slot");
        false
      }
    }
  }

  async fn bounded<T>(
    &self,
    operation: &'static str,
    fut: impl Future<Output = Result<T, KvError>>,
  ) -> Result<T, StoreError> {
    match tokio::time::timeout(self.timeout, fut).await {
      Ok(result) => result.map_err(StoreError::from),
      Err(_) => Err(StoreError::Timeout { operation }),
    }
  }
}

/// Decode stored text, checking the record's shape before its contents.
fn decode(text: &str) -> Result<Snapshot, StoreError> {
  let value: Value = serde_json::from_str(text).map_err(|e| StoreError::CorruptRecord {
    reason: format!("invalid JSON: {}", e),
  })?;

  let is_array = |field: &str| value.get(field).is_some_and(Value::is_array);
  if !is_array("nodes") || !is_array("edges") {
    return Err(StoreError::CorruptRecord {
      reason: "nodes and edges must be arrays".to_string(),
    });
  }
  if !value.get("timestamp").is_some_and(is_truthy) {
    return Err(StoreError::CorruptRecord {
      reason: "missing timestamp".to_string(),
    });
  }

  serde_json::from_value(value).map_err(|e| StoreError::CorruptRecord {
    reason: e.to_string(),
  })
}

fn is_truthy(value: &Value) -> bool {
  match value {
    Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
    Value::String(s) => !s.is_empty(),
    Value::Array(_) | Value::Object(_) => true,
  }
}
