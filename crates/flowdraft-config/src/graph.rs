use std::collections::HashSet;

use crate::edge::Edge;

/// Incoming-edge view over a workflow for connectivity checks.
#[derive(Debug, Clone, Default)]
pub struct Graph {
  /// Every node id that is the target of at least one edge.
  targets: HashSet<String>,
}

impl Graph {
  /// Build the view from edges.
  ///
  /// Edges whose source is not a known node still count as incoming.
  pub fn new(edges: &[Edge]) -> Self {
    Self {
      targets: edges.iter().map(|edge| edge.target.clone()).collect(),
    }
  }

  pub fn has_incoming(&self, node_id: &str) -> bool {
    self.targets.contains(node_id)
  }
}
