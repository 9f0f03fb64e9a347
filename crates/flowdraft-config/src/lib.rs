//! Flowdraft Config
//!
//! This crate contains the serializable workflow graph types for flowdraft.
//! A workflow is authored as a set of typed nodes (start, form, conditional,
//! API call, end) joined by directed edges.
//!
//! Graphs can be loaded from:
//! - JSON files (via CLI with `flowdraft validate workflow.json`)
//! - The auto-save slot (as a [`Snapshot`] JSON blob)
//!
//! Node data is a sum type keyed by the node's `type`, so an unknown node
//! type or enum value is rejected when the graph is decoded rather than
//! discovered later by the validators.

mod edge;
mod error;
mod graph;
mod node;
mod workflow;

pub use edge::Edge;
pub use error::ConfigError;
pub use graph::Graph;
pub use node::{
  ApiData, ConditionalData, ConditionalOperator, FieldType, FormData, FormField, HttpMethod,
  LabelData, Node, NodeData, NodeKind, Position, Route, RouteId,
};
pub use workflow::{
  ExportMetadata, SNAPSHOT_VERSION, Snapshot, WorkflowExport, WorkflowGraph,
};
