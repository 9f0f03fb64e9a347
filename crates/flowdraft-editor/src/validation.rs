//! Debounced re-validation of the live graph.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use flowdraft_config::WorkflowGraph;
use flowdraft_validation::{
  FieldValidationResult, ValidationError, WorkflowValidation, validate_graph,
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::debounce::Debouncer;
use crate::events::{EditorEvent, EditorNotifier};

/// The latest published validation outcome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationState {
  /// Aggregated workflow- and node-level errors.
  pub errors: Vec<ValidationError>,
  /// Field errors per node id, only for nodes that are currently invalid.
  pub node_errors: HashMap<String, Vec<FieldValidationResult>>,
}

impl ValidationState {
  /// True iff there are no aggregated errors.
  pub fn is_valid(&self) -> bool {
    self.errors.is_empty()
  }
}

impl From<WorkflowValidation> for ValidationState {
  fn from(result: WorkflowValidation) -> Self {
    let node_errors = result.node_errors();
    Self {
      errors: result.errors,
      node_errors,
    }
  }
}

/// Re-runs the validators once the graph has been quiet for the debounce
/// window and publishes the result.
///
/// The published state can lag the latest edit by up to one window; callers
/// that must not act on stale results validate synchronously instead.
pub struct ValidationOrchestrator<N: EditorNotifier> {
  debouncer: Debouncer,
  state: Arc<watch::Sender<ValidationState>>,
  notifier: Arc<N>,
}

impl<N: EditorNotifier + 'static> ValidationOrchestrator<N> {
  pub fn new(debounce: Duration, cancel: CancellationToken, notifier: Arc<N>) -> Self {
    let (state, _) = watch::channel(ValidationState::default());
    Self {
      debouncer: Debouncer::new(debounce, cancel),
      state: Arc::new(state),
      notifier,
    }
  }

  /// Record a graph change; validation runs when the window elapses.
  pub fn notify_changed(&self, graph: WorkflowGraph) {
    let state = self.state.clone();
    let notifier = self.notifier.clone();
    self.debouncer.schedule(async move {
      publish(&state, notifier.as_ref(), &graph);
    });
  }

  /// Validate immediately, dropping any pending debounced pass.
  pub fn validate_now(&self, graph: &WorkflowGraph) -> ValidationState {
    self.debouncer.cancel();
    publish(&self.state, self.notifier.as_ref(), graph)
  }

  pub fn state(&self) -> ValidationState {
    self.state.borrow().clone()
  }

  pub fn is_workflow_valid(&self) -> bool {
    self.state.borrow().is_valid()
  }

  /// Observe published validation states.
  pub fn subscribe(&self) -> watch::Receiver<ValidationState> {
    self.state.subscribe()
  }

  /// Drop the pending validation pass.
  pub fn cancel(&self) {
    self.debouncer.cancel();
  }
}

fn publish<N: EditorNotifier>(
  state: &watch::Sender<ValidationState>,
  notifier: &N,
  graph: &WorkflowGraph,
) -> ValidationState {
  let next = ValidationState::from(validate_graph(graph));
  debug!(errors = next.errors.len(), "published validation state");
  notifier.notify(EditorEvent::ValidationCompleted {
    error_count: next.errors.len(),
  });
  state.send_replace(next.clone());
  next
}
