use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use crate::error::KvError;

/// Boxed future returned by [`KvStore`] operations.
pub type KvFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, KvError>> + Send + 'a>>;

/// Trait for key-value storage backing the auto-save slot.
///
/// This trait is async to support networked backends; local backends
/// resolve immediately.
pub trait KvStore: Send + Sync {
  /// Get a value by key.
  fn get(&self, key: &str) -> KvFuture<'_, Option<String>>;

  /// Set a value, replacing any previous value under the key.
  fn set(&mut self, key: &str, value: String) -> KvFuture<'_, ()>;

  /// Delete a value. Deleting a missing key is not an error.
  fn delete(&mut self, key: &str) -> KvFuture<'_, ()>;
}

/// In-memory KV store implementation.
///
/// Suitable for tests or sessions that do not need to outlive the process.
#[derive(Debug, Default)]
pub struct InMemoryKvStore {
  data: HashMap<String, String>,
}

impl InMemoryKvStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// A store seeded with one entry.
  pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
    let mut data = HashMap::new();
    data.insert(key.into(), value.into());
    Self { data }
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }
}

impl KvStore for InMemoryKvStore {
  fn get(&self, key: &str) -> KvFuture<'_, Option<String>> {
    let value = self.data.get(key).cloned();
    Box::pin(async move { Ok(value) })
  }

  fn set(&mut self, key: &str, value: String) -> KvFuture<'_, ()> {
    self.data.insert(key.to_string(), value);
    Box::pin(async { Ok(()) })
  }

  fn delete(&mut self, key: &str) -> KvFuture<'_, ()> {
    self.data.remove(key);
    Box::pin(async { Ok(()) })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_in_memory_kv_store() {
    let mut store = InMemoryKvStore::new();

    assert_eq!(store.get("key").await.unwrap(), None);

    store.set("key", "value".to_string()).await.unwrap();
    assert_eq!(store.get("key").await.unwrap(), Some("value".to_string()));

    store.set("key", "updated".to_string()).await.unwrap();
    assert_eq!(store.get("key").await.unwrap(), Some("updated".to_string()));
    assert_eq!(store.len(), 1);

    store.delete("key").await.unwrap();
    assert_eq!(store.get("key").await.unwrap(), None);

    // Deleting again is a no-op.
    store.delete("key").await.unwrap();
    assert!(store.is_empty());
  }
}
