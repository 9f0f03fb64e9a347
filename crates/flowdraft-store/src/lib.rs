//! Flowdraft Store
//!
//! Persistence for the auto-save slot.
//!
//! The [`KvStore`] trait is the narrow storage seam (`get`/`set`/`delete` by
//! key) so the backing medium can be swapped without touching the auto-save
//! controller. Two backends are provided:
//! - [`InMemoryKvStore`] for tests and ephemeral sessions
//! - [`FsKvStore`] storing one file per key under a directory
//!
//! [`SnapshotStore`] wraps a backend as a single-slot store of
//! [`Snapshot`](flowdraft_config::Snapshot)s with a size ceiling and
//! self-healing erasure of corrupt records.

mod error;
mod fs;
mod kv;
mod snapshot;

pub use error::{KvError, StoreError};
pub use fs::FsKvStore;
pub use kv::{InMemoryKvStore, KvFuture, KvStore};
pub use snapshot::{DEFAULT_KEY, DEFAULT_MAX_BYTES, DEFAULT_TIMEOUT, SnapshotStore};
