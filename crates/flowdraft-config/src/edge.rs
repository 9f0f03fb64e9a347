use serde::{Deserialize, Serialize};

/// A directed connection between two nodes.
///
/// Several edges may join the same pair of nodes, e.g. both routes of a
/// conditional pointing at one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
  pub id: String,
  pub source: String,
  pub target: String,

  /// Route label shown on the edge ("True" / "False" for conditional branches).
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,

  /// Output handle on the source node the edge leaves from.
  #[serde(
    rename = "sourceHandle",
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub source_handle: Option<String>,
}

impl Edge {
  pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      source: source.into(),
      target: target.into(),
      label: None,
      source_handle: None,
    }
  }

  pub fn with_label(mut self, label: impl Into<String>) -> Self {
    self.label = Some(label.into());
    self
  }

  /// Whether this edge touches the given node on either end.
  pub fn touches(&self, node_id: &str) -> bool {
    self.source == node_id || self.target == node_id
  }
}
