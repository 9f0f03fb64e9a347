//! Flowdraft Validation
//!
//! Pure validators for workflow graphs. Nothing here mutates the graph or
//! keeps state between calls, so validation can be re-run on every debounce
//! tick and used as a save gate without coordination.
//!
//! Two layers are checked:
//! - Structure: exactly one start node, exactly one end node, and every
//!   non-start node is the target of at least one edge.
//! - Node fields: per-type rules for form, conditional and API nodes. Start
//!   and end nodes have no field schema.
//!
//! [`validate_workflow`] runs both layers and aggregates the findings into
//! UI-ready [`ValidationError`]s.

mod node;
mod structure;
mod types;
mod workflow;

pub use node::validate_node;
pub use structure::{
  ALL_NODES_CONNECTED, EXACTLY_ONE_END, EXACTLY_ONE_START, validate_structure,
};
pub use types::{FieldValidationResult, NodeValidationResult, Severity, ValidationError, WorkflowValidation};
pub use workflow::{validate_graph, validate_workflow};
