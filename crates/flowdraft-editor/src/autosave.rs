//! Validation-gated auto-save with restore and discard.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use flowdraft_config::{Snapshot, WorkflowGraph};
use flowdraft_store::{KvStore, SnapshotStore, StoreError};
use flowdraft_validation::validate_graph;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::EditorConfig;
use crate::debounce::Debouncer;
use crate::error::EditorError;
use crate::events::{EditorEvent, EditorNotifier};
use crate::status::{SaveState, SaveStatus};

/// Persists the live graph once edits settle, but only while it validates.
///
/// Each graph change restarts the debounce window. When the window elapses
/// the graph is validated synchronously and, if valid, written to the
/// snapshot slot. The published [`SaveStatus`] moves through
/// `saving → saved|error → idle`; the decay back to `idle` never blocks the
/// next save.
pub struct AutoSaveController<S: KvStore, N: EditorNotifier> {
  inner: Arc<Inner<S, N>>,
  debouncer: Debouncer,
}

struct Inner<S: KvStore, N: EditorNotifier> {
  store: SnapshotStore<S>,
  status: watch::Sender<SaveStatus>,
  has_saved_data: AtomicBool,
  restore_dismissed: AtomicBool,
  decay: Debouncer,
  saved_display: Duration,
  error_display: Duration,
  notifier: Arc<N>,
}

impl<S, N> AutoSaveController<S, N>
where
  S: KvStore + 'static,
  N: EditorNotifier + 'static,
{
  /// Create a controller, probing the slot for previously saved data.
  pub async fn load(
    store: SnapshotStore<S>,
    config: &EditorConfig,
    notifier: Arc<N>,
    cancel: CancellationToken,
  ) -> Self {
    let has_saved_data = store.exists().await;
    if has_saved_data {
      debug!(key = store.key(), "found auto-saved workflow");
    }

    let (status, _) = watch::channel(SaveStatus::default());
    let inner = Arc::new(Inner {
      store,
      status,
      has_saved_data: AtomicBool::new(has_saved_data),
      restore_dismissed: AtomicBool::new(false),
      decay: Debouncer::new(config.saved_display(), cancel.clone()),
      saved_display: config.saved_display(),
      error_display: config.error_display(),
      notifier,
    });

    Self {
      inner,
      debouncer: Debouncer::new(config.autosave_debounce(), cancel),
    }
  }

  /// Record a graph change and restart the auto-save window.
  ///
  /// An empty graph never schedules a save and drops any pending one.
  pub fn notify_graph_changed(&self, graph: WorkflowGraph) {
    if graph.is_empty() {
      self.debouncer.cancel();
      return;
    }

    let inner = self.inner.clone();
    self.debouncer.schedule(async move {
      save_if_valid(&inner, graph).await;
    });
  }

  /// Validate and persist immediately, dropping any pending auto-save.
  pub async fn save_now(&self, graph: &WorkflowGraph) -> Result<DateTime<Utc>, EditorError> {
    self.debouncer.cancel();

    let validation = validate_graph(graph);
    if !validation.is_valid {
      return Err(EditorError::InvalidWorkflow {
        error_count: validation.errors.len(),
      });
    }

    persist(&self.inner, graph)
      .await
      .map_err(|source| EditorError::Store { source })
  }

  /// Read the saved snapshot for the caller to load.
  ///
  /// The restore prompt is dismissed either way. A slot that turns out to
  /// be empty or corrupt no longer counts as saved data.
  pub async fn restore(&self) -> Option<Snapshot> {
    self.inner.restore_dismissed.store(true, Ordering::SeqCst);
    let snapshot = self.inner.store.read().await;
    if snapshot.is_none() {
      self.inner.has_saved_data.store(false, Ordering::SeqCst);
    }
    snapshot
  }

  /// Erase the saved snapshot and stop offering a restore this session.
  pub async fn discard(&self) {
    self.inner.restore_dismissed.store(true, Ordering::SeqCst);
    self.inner.store.clear().await;
    self.inner.has_saved_data.store(false, Ordering::SeqCst);
    self.inner.status.send_modify(|status| status.last_saved = None);
    info!(key = self.inner.store.key(), "discarded auto-saved workflow");
  }

  pub fn has_saved_data(&self) -> bool {
    self.inner.has_saved_data.load(Ordering::SeqCst)
  }

  /// Whether the user should be offered a restore.
  ///
  /// True only while saved data exists, the live graph is empty, and the
  /// prompt has not been answered.
  pub fn should_offer_restore(&self, graph_is_empty: bool) -> bool {
    graph_is_empty
      && self.has_saved_data()
      && !self.inner.restore_dismissed.load(Ordering::SeqCst)
  }

  pub fn status(&self) -> SaveStatus {
    *self.inner.status.borrow()
  }

  /// Observe save status transitions.
  pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
    self.inner.status.subscribe()
  }

  /// Drop the pending auto-save and status decay.
  pub fn shutdown(&self) {
    self.debouncer.cancel();
    self.inner.decay.cancel();
  }
}

impl<S: KvStore, N: EditorNotifier> Drop for AutoSaveController<S, N> {
  fn drop(&mut self) {
    self.inner.decay.cancel();
  }
}

async fn save_if_valid<S, N>(inner: &Arc<Inner<S, N>>, graph: WorkflowGraph)
where
  S: KvStore + 'static,
  N: EditorNotifier + 'static,
{
  let validation = validate_graph(&graph);
  if !validation.is_valid {
    debug!(
      errors = validation.errors.len(),
      "skipping auto-save of invalid workflow"
    );
    inner.notifier.notify(EditorEvent::SaveSkipped {
      error_count: validation.errors.len(),
    });
    return;
  }

  // Failures are published through the status and notifier.
  let _ = persist(inner, &graph).await;
}

async fn persist<S, N>(
  inner: &Arc<Inner<S, N>>,
  graph: &WorkflowGraph,
) -> Result<DateTime<Utc>, StoreError>
where
  S: KvStore + 'static,
  N: EditorNotifier + 'static,
{
  inner.decay.cancel();
  inner
    .status
    .send_modify(|status| status.state = SaveState::Saving);
  inner.notifier.notify(EditorEvent::SaveStarted);

  let saved_at = Utc::now();
  match inner.store.write(&Snapshot::new(graph, saved_at)).await {
    Ok(()) => {
      inner.has_saved_data.store(true, Ordering::SeqCst);
      inner.status.send_replace(SaveStatus {
        state: SaveState::Saved,
        last_saved: Some(saved_at),
      });
      inner.notifier.notify(EditorEvent::SaveSucceeded {
        timestamp: saved_at.timestamp_millis(),
      });
      info!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "auto-saved workflow"
      );
      schedule_reset(inner, inner.saved_display);
      Ok(saved_at)
    }
    Err(e) => {
      error!(error = %e, "auto-save failed");
      inner
        .status
        .send_modify(|status| status.state = SaveState::Error);
      inner.notifier.notify(EditorEvent::SaveFailed {
        error: e.to_string(),
      });
      schedule_reset(inner, inner.error_display);
      Err(e)
    }
  }
}

fn schedule_reset<S, N>(inner: &Arc<Inner<S, N>>, after: Duration)
where
  S: KvStore + 'static,
  N: EditorNotifier + 'static,
{
  let target = inner.clone();
  inner.decay.schedule_after(after, async move {
    let reset = target.status.send_if_modified(|status| {
      if matches!(status.state, SaveState::Saved | SaveState::Error) {
        status.state = SaveState::Idle;
        true
      } else {
        false
      }
    });
    if reset {
      target.notifier.notify(EditorEvent::StatusReset);
    }
  });
}
