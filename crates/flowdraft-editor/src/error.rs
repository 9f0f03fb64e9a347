//! Editor errors.

use flowdraft_config::NodeKind;
use flowdraft_store::StoreError;

/// Errors returned by editor operations.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
  /// Node not found in the graph.
  #[error("node '{node_id}' not found in workflow")]
  NodeNotFound { node_id: String },

  /// Edge not found in the graph.
  #[error("edge '{edge_id}' not found in workflow")]
  EdgeNotFound { edge_id: String },

  /// Replacement data is for a different node type.
  #[error("node '{node_id}' is a {expected} node, got {actual} data")]
  KindMismatch {
    node_id: String,
    expected: NodeKind,
    actual: NodeKind,
  },

  /// The node has no editable fields.
  #[error("{kind} node '{node_id}' has no editable fields")]
  NotEditable { node_id: String, kind: NodeKind },

  /// The workflow has validation errors.
  #[error("workflow has {error_count} validation error(s)")]
  InvalidWorkflow { error_count: usize },

  /// Persisting the snapshot failed.
  #[error("failed to save workflow: {source}")]
  Store {
    #[source]
    source: StoreError,
  },
}
