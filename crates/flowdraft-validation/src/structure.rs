//! Graph-level well-formedness checks.

use flowdraft_config::{Edge, Graph, Node, NodeKind};

use crate::types::ValidationError;

pub const EXACTLY_ONE_START: &str = "Workflow must contain exactly 1 start block";
pub const EXACTLY_ONE_END: &str = "Workflow must contain exactly 1 end block";
pub const ALL_NODES_CONNECTED: &str = "All nodes must be connected";

/// Check start/end counts and incoming connectivity.
///
/// Each failing rule yields one error with id `validation-<n>`, numbered in
/// the order the rules fail.
pub fn validate_structure(nodes: &[Node], edges: &[Edge]) -> Vec<ValidationError> {
  let mut messages = Vec::new();

  if count_kind(nodes, NodeKind::Start) != 1 {
    messages.push(EXACTLY_ONE_START);
  }
  if count_kind(nodes, NodeKind::End) != 1 {
    messages.push(EXACTLY_ONE_END);
  }

  // Start nodes are entry points and need no incoming edge.
  let graph = Graph::new(edges);
  let disconnected = nodes
    .iter()
    .any(|node| node.kind() != NodeKind::Start && !graph.has_incoming(&node.id));
  if disconnected {
    messages.push(ALL_NODES_CONNECTED);
  }

  messages
    .into_iter()
    .enumerate()
    .map(|(index, message)| ValidationError::workflow(format!("validation-{}", index), message))
    .collect()
}

fn count_kind(nodes: &[Node], kind: NodeKind) -> usize {
  nodes.iter().filter(|n| n.kind() == kind).count()
}
