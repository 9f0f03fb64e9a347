use thiserror::Error;

use crate::node::NodeKind;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid data for {kind} node '{node_id}': {source}")]
  InvalidNodeData {
    node_id: String,
    kind: NodeKind,
    #[source]
    source: serde_json::Error,
  },
}
