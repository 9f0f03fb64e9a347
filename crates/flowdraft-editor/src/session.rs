//! The editing session driven by the canvas.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use flowdraft_config::{
  Edge, Node, NodeData, NodeKind, Position, RouteId, WorkflowExport, WorkflowGraph,
};
use flowdraft_store::KvStore;
use flowdraft_validation::FieldValidationResult;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::autosave::AutoSaveController;
use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::events::{EditorNotifier, NoopNotifier};
use crate::ids::NodeIdGenerator;
use crate::status::SaveStatus;
use crate::validation::{ValidationOrchestrator, ValidationState};

/// Name stamped on exported workflow documents.
pub const EXPORT_NAME: &str = "Sample Workflow";

/// One open workflow: the live graph plus its validation and auto-save.
///
/// Every mutation feeds both debounced pipelines. Closing (or dropping) the
/// session cancels all pending timers so nothing runs against a disposed
/// graph.
pub struct EditorSession<S: KvStore, N: EditorNotifier = NoopNotifier> {
  graph: WorkflowGraph,
  ids: NodeIdGenerator,
  selected: Option<String>,
  validation: ValidationOrchestrator<N>,
  autosave: AutoSaveController<S, N>,
  cancel: CancellationToken,
}

impl<S: KvStore + 'static> EditorSession<S, NoopNotifier> {
  /// Open a session with an empty graph over the given storage backend.
  pub async fn open(kv: S, config: &EditorConfig) -> Self {
    Self::open_with_notifier(kv, config, Arc::new(NoopNotifier)).await
  }
}

impl<S, N> EditorSession<S, N>
where
  S: KvStore + 'static,
  N: EditorNotifier + 'static,
{
  pub async fn open_with_notifier(kv: S, config: &EditorConfig, notifier: Arc<N>) -> Self {
    let cancel = CancellationToken::new();
    let validation = ValidationOrchestrator::new(
      config.validation_debounce(),
      cancel.clone(),
      notifier.clone(),
    );
    let autosave = AutoSaveController::load(
      config.snapshot_store(kv),
      config,
      notifier,
      cancel.clone(),
    )
    .await;

    let session = Self {
      graph: WorkflowGraph::default(),
      ids: NodeIdGenerator::new(),
      selected: None,
      validation,
      autosave,
      cancel,
    };
    // The empty canvas is validated like any other graph; auto-save skips it.
    session.validation.notify_changed(session.graph.clone());
    session
  }

  pub fn graph(&self) -> &WorkflowGraph {
    &self.graph
  }

  /// Add a block with its default data. Returns the new node id.
  pub fn add_node(&mut self, kind: NodeKind, position: Option<Position>) -> String {
    let id = self.ids.next_id();
    let node = Node::with_defaults(id.clone(), kind, position.unwrap_or_default());
    debug!(node_id = %id, kind = %kind, "added node");
    self.graph.nodes.push(node);
    self.changed();
    id
  }

  /// Replace a node's data. The new data must be for the same node kind.
  pub fn update_node_data(&mut self, node_id: &str, data: NodeData) -> Result<(), EditorError> {
    let node = self
      .graph
      .node_mut(node_id)
      .ok_or_else(|| EditorError::NodeNotFound {
        node_id: node_id.to_string(),
      })?;

    if node.kind() != data.kind() {
      return Err(EditorError::KindMismatch {
        node_id: node_id.to_string(),
        expected: node.kind(),
        actual: data.kind(),
      });
    }

    node.data = data;
    self.changed();
    Ok(())
  }

  pub fn move_node(&mut self, node_id: &str, position: Position) -> Result<(), EditorError> {
    let node = self
      .graph
      .node_mut(node_id)
      .ok_or_else(|| EditorError::NodeNotFound {
        node_id: node_id.to_string(),
      })?;
    node.position = position;
    self.changed();
    Ok(())
  }

  /// Remove a node together with every edge touching it.
  pub fn delete_node(&mut self, node_id: &str) -> Result<(), EditorError> {
    let before = self.graph.nodes.len();
    self.graph.nodes.retain(|node| node.id != node_id);
    if self.graph.nodes.len() == before {
      return Err(EditorError::NodeNotFound {
        node_id: node_id.to_string(),
      });
    }

    self.graph.edges.retain(|edge| !edge.touches(node_id));
    if self.selected.as_deref() == Some(node_id) {
      self.selected = None;
    }
    debug!(node_id, "deleted node");
    self.changed();
    Ok(())
  }

  /// Connect two nodes. Returns the edge id.
  ///
  /// Leaving a conditional node through a route handle (`"true"` or
  /// `"false"`) labels the edge with that route's label. Repeating an
  /// existing source/handle/target connection returns that edge unchanged.
  pub fn connect(
    &mut self,
    source: &str,
    target: &str,
    source_handle: Option<&str>,
  ) -> Result<String, EditorError> {
    let source_node = self
      .graph
      .node(source)
      .ok_or_else(|| EditorError::NodeNotFound {
        node_id: source.to_string(),
      })?;
    if self.graph.node(target).is_none() {
      return Err(EditorError::NodeNotFound {
        node_id: target.to_string(),
      });
    }

    let existing = self.graph.edges.iter().find(|edge| {
      edge.source == source
        && edge.target == target
        && edge.source_handle.as_deref() == source_handle
    });
    if let Some(edge) = existing {
      return Ok(edge.id.clone());
    }

    let label = match (&source_node.data, source_handle) {
      (NodeData::Conditional(data), Some(handle)) => {
        let route_label = RouteId::from_handle(handle)
          .and_then(|id| data.route(id))
          .map(|route| route.label.as_str())
          .filter(|label| !label.is_empty());
        Some(route_label.unwrap_or(handle).to_string())
      }
      _ => None,
    };

    let id = self.edge_id(source, target, source_handle);
    let mut edge = Edge::new(id.clone(), source, target);
    edge.label = label;
    edge.source_handle = source_handle.map(str::to_string);

    debug!(edge_id = %id, source, target, "connected nodes");
    self.graph.edges.push(edge);
    self.changed();
    Ok(id)
  }

  pub fn remove_edge(&mut self, edge_id: &str) -> Result<(), EditorError> {
    let before = self.graph.edges.len();
    self.graph.edges.retain(|edge| edge.id != edge_id);
    if self.graph.edges.len() == before {
      return Err(EditorError::EdgeNotFound {
        edge_id: edge_id.to_string(),
      });
    }
    self.changed();
    Ok(())
  }

  /// Select a node for editing. Start and end nodes have nothing to edit.
  pub fn select_node(&mut self, node_id: &str) -> Result<(), EditorError> {
    let node = self
      .graph
      .node(node_id)
      .ok_or_else(|| EditorError::NodeNotFound {
        node_id: node_id.to_string(),
      })?;
    if !node.kind().has_field_schema() {
      return Err(EditorError::NotEditable {
        node_id: node_id.to_string(),
        kind: node.kind(),
      });
    }
    self.selected = Some(node_id.to_string());
    Ok(())
  }

  pub fn selected_node(&self) -> Option<&Node> {
    self
      .selected
      .as_deref()
      .and_then(|id| self.graph.node(id))
  }

  pub fn clear_selection(&mut self) {
    self.selected = None;
  }

  /// Published field errors for the selected node.
  pub fn selected_node_errors(&self) -> Vec<FieldValidationResult> {
    let Some(id) = self.selected.as_deref() else {
      return Vec::new();
    };
    self
      .validation
      .state()
      .node_errors
      .remove(id)
      .unwrap_or_default()
  }

  pub fn validation_state(&self) -> ValidationState {
    self.validation.state()
  }

  /// The latest published "workflow is valid" signal.
  pub fn is_workflow_valid(&self) -> bool {
    self.validation.is_workflow_valid()
  }

  /// Validate the live graph now instead of waiting for the debounce.
  pub fn validate_now(&self) -> ValidationState {
    self.validation.validate_now(&self.graph)
  }

  pub fn subscribe_validation(&self) -> watch::Receiver<ValidationState> {
    self.validation.subscribe()
  }

  pub fn save_status(&self) -> SaveStatus {
    self.autosave.status()
  }

  pub fn subscribe_save_status(&self) -> watch::Receiver<SaveStatus> {
    self.autosave.subscribe()
  }

  pub fn has_saved_data(&self) -> bool {
    self.autosave.has_saved_data()
  }

  /// Whether to ask the user about restoring the auto-saved workflow.
  pub fn offer_restore(&self) -> bool {
    self.autosave.should_offer_restore(self.graph.is_empty())
  }

  /// Replace the live graph with the auto-saved one.
  ///
  /// Returns false when there was nothing usable to restore.
  pub async fn restore(&mut self) -> bool {
    let Some(snapshot) = self.autosave.restore().await else {
      return false;
    };
    info!(
      nodes = snapshot.nodes.len(),
      edges = snapshot.edges.len(),
      "restoring auto-saved workflow"
    );
    self.replace_graph(snapshot.into_graph());
    true
  }

  /// Decline the restore and erase the auto-saved workflow.
  pub async fn discard(&mut self) {
    self.autosave.discard().await;
  }

  /// Load a whole graph, continuing node numbering after its ids.
  pub fn replace_graph(&mut self, graph: WorkflowGraph) {
    self
      .ids
      .seed_from(graph.nodes.iter().map(|node| node.id.as_str()));
    self.graph = graph;
    self.selected = None;
    self.changed();
  }

  /// Export the workflow document. Refused while validation reports errors.
  pub fn save(&self) -> Result<WorkflowExport, EditorError> {
    let state = self.validation.state();
    if !state.is_valid() {
      return Err(EditorError::InvalidWorkflow {
        error_count: state.errors.len(),
      });
    }

    let export = WorkflowExport::new(&self.graph, EXPORT_NAME, Utc::now());
    info!(
      nodes = export.nodes.len(),
      edges = export.edges.len(),
      "exported workflow"
    );
    Ok(export)
  }

  /// Persist the live graph now instead of waiting for the debounce.
  pub async fn flush(&self) -> Result<DateTime<Utc>, EditorError> {
    self.autosave.save_now(&self.graph).await
  }

  /// Cancel every pending timer. Further edits schedule nothing.
  pub fn close(&self) {
    self.autosave.shutdown();
    self.validation.cancel();
    self.cancel.cancel();
  }

  fn changed(&self) {
    self.validation.notify_changed(self.graph.clone());
    self.autosave.notify_graph_changed(self.graph.clone());
  }

  fn edge_id(&self, source: &str, target: &str, source_handle: Option<&str>) -> String {
    let base = match source_handle {
      Some(handle) => format!("edge-{}-{}-{}", source, target, handle),
      None => format!("edge-{}-{}", source, target),
    };
    if self.graph.edge(&base).is_none() {
      return base;
    }
    (1..)
      .map(|n| format!("{}-{}", base, n))
      .find(|id| self.graph.edge(id).is_none())
      .unwrap_or(base)
  }
}

impl<S: KvStore, N: EditorNotifier> Drop for EditorSession<S, N> {
  fn drop(&mut self) {
    self.cancel.cancel();
  }
}
