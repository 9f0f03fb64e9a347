//! Storage error types.

/// Errors raised by a [`KvStore`](crate::KvStore) backend.
#[derive(Debug, thiserror::Error)]
pub enum KvError {
  /// The backend cannot be used (disabled, sandboxed, quota exhausted).
  #[error("storage unavailable: {0}")]
  Unavailable(String),

  /// The key cannot be mapped onto the backend.
  #[error("invalid storage key '{0}'")]
  InvalidKey(String),

  #[error("storage i/o error: {0}")]
  Io(#[from] std::io::Error),
}

/// Errors raised by the [`SnapshotStore`](crate::SnapshotStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  /// The serialized snapshot is larger than the slot allows.
  #[error("workflow data too large for storage: {size} bytes exceeds limit of {limit} bytes")]
  CapacityExceeded { size: usize, limit: usize },

  /// The backend failed.
  #[error(transparent)]
  Unavailable(#[from] KvError),

  /// The backend did not answer in time.
  #[error("storage {operation} timed out")]
  Timeout { operation: &'static str },

  /// The snapshot could not be serialized.
  #[error("failed to serialize snapshot: {0}")]
  Serialization(#[from] serde_json::Error),

  /// The stored record is not a usable snapshot.
  #[error("corrupt auto-save record: {reason}")]
  CorruptRecord { reason: String },
}
