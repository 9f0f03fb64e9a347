use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::edge::Edge;
use crate::node::Node;

/// Schema tag written into every snapshot.
pub const SNAPSHOT_VERSION: &str = "1.0.0";

/// The live node/edge graph being authored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowGraph {
  #[serde(default)]
  pub nodes: Vec<Node>,
  #[serde(default)]
  pub edges: Vec<Edge>,
}

impl WorkflowGraph {
  pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
    Self { nodes, edges }
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  pub fn node(&self, node_id: &str) -> Option<&Node> {
    self.nodes.iter().find(|n| n.id == node_id)
  }

  pub fn node_mut(&mut self, node_id: &str) -> Option<&mut Node> {
    self.nodes.iter_mut().find(|n| n.id == node_id)
  }

  pub fn edge(&self, edge_id: &str) -> Option<&Edge> {
    self.edges.iter().find(|e| e.id == edge_id)
  }
}

/// A complete, timestamped copy of the graph persisted as one unit.
///
/// Snapshots are never patched; the next save supersedes the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
  pub nodes: Vec<Node>,
  pub edges: Vec<Edge>,
  /// Milliseconds since the Unix epoch.
  pub timestamp: i64,
  #[serde(default = "snapshot_version")]
  pub version: String,
}

fn snapshot_version() -> String {
  SNAPSHOT_VERSION.to_string()
}

impl Snapshot {
  pub fn new(graph: &WorkflowGraph, saved_at: DateTime<Utc>) -> Self {
    Self {
      nodes: graph.nodes.clone(),
      edges: graph.edges.clone(),
      timestamp: saved_at.timestamp_millis(),
      version: SNAPSHOT_VERSION.to_string(),
    }
  }

  pub fn saved_at(&self) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(self.timestamp)
  }

  pub fn into_graph(self) -> WorkflowGraph {
    WorkflowGraph {
      nodes: self.nodes,
      edges: self.edges,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
  pub name: String,
  pub version: String,
  pub created: DateTime<Utc>,
}

/// Workflow configuration document produced by a manual save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowExport {
  pub nodes: Vec<Node>,
  pub edges: Vec<Edge>,
  pub metadata: ExportMetadata,
}

impl WorkflowExport {
  pub fn new(graph: &WorkflowGraph, name: impl Into<String>, created: DateTime<Utc>) -> Self {
    Self {
      nodes: graph.nodes.clone(),
      edges: graph.edges.clone(),
      metadata: ExportMetadata {
        name: name.into(),
        version: SNAPSHOT_VERSION.to_string(),
        created,
      },
    }
  }
}
