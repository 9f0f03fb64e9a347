//! Editor events and notifiers for observability.
//!
//! Events are emitted by the validation orchestrator and the auto-save
//! controller so consumers can drive status indicators, record metrics, or
//! assert on timing in tests.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Events emitted while a workflow is being edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditorEvent {
  /// A debounced validation pass has finished.
  ValidationCompleted { error_count: usize },

  /// An auto-save attempt passed validation and is writing.
  SaveStarted,

  /// The snapshot was written.
  SaveSucceeded { timestamp: i64 },

  /// Writing the snapshot failed.
  SaveFailed { error: String },

  /// An auto-save attempt was skipped because the workflow is invalid.
  SaveSkipped { error_count: usize },

  /// The saved/error status decayed back to idle.
  StatusReset,
}

/// Trait for receiving editor events.
///
/// Implementations decide what to do with each event (log, forward,
/// ignore). `notify` is called from timer tasks and must not block.
pub trait EditorNotifier: Send + Sync {
  fn notify(&self, event: EditorEvent);
}

/// A no-op notifier that discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl EditorNotifier for NoopNotifier {
  fn notify(&self, _event: EditorEvent) {}
}

/// A notifier that forwards events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<EditorEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<EditorEvent>) -> Self {
    Self { sender }
  }

  /// Create a notifier together with the receiving end of its channel.
  pub fn channel() -> (Self, mpsc::UnboundedReceiver<EditorEvent>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Self::new(sender), receiver)
  }
}

impl EditorNotifier for ChannelNotifier {
  fn notify(&self, event: EditorEvent) {
    // Ignore send errors - receiver may have been dropped
    let _ = self.sender.send(event);
  }
}
