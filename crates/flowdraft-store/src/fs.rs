use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::KvError;
use crate::kv::{KvFuture, KvStore};

/// Filesystem-backed KV store.
///
/// Each key is stored as its own file:
/// ```text
/// {root}/
/// └── workflow-autosave.json
/// ```
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write never leaves a truncated record behind.
pub struct FsKvStore {
  root: PathBuf,
}

impl FsKvStore {
  /// Create a store rooted at the given directory. The directory is created
  /// on first write.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Map a key onto its file, rejecting keys that would escape the root.
  fn path_for(&self, key: &str) -> Result<PathBuf, KvError> {
    let invalid = key.is_empty()
      || key.starts_with('.')
      || key.contains(['/', '\\'])
      || key.contains("..");
    if invalid {
      return Err(KvError::InvalidKey(key.to_string()));
    }
    Ok(self.root.join(format!("{}.json", key)))
  }
}

impl KvStore for FsKvStore {
  fn get(&self, key: &str) -> KvFuture<'_, Option<String>> {
    let path = self.path_for(key);
    Box::pin(async move {
      match fs::read_to_string(path?).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
      }
    })
  }

  fn set(&mut self, key: &str, value: String) -> KvFuture<'_, ()> {
    let path = self.path_for(key);
    Box::pin(async move {
      let path = path?;
      fs::create_dir_all(&self.root).await?;
      let staging = path.with_extension("json.tmp");
      fs::write(&staging, value).await?;
      fs::rename(&staging, &path).await?;
      Ok(())
    })
  }

  fn delete(&mut self, key: &str) -> KvFuture<'_, ()> {
    let path = self.path_for(key);
    Box::pin(async move {
      match fs::remove_file(path?).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
      }
    })
  }
}
