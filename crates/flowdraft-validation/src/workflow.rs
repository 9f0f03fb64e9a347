//! Whole-workflow validation and error aggregation.

use flowdraft_config::{Edge, Node, WorkflowGraph};
use tracing::debug;

use crate::node::validate_node;
use crate::structure::validate_structure;
use crate::types::{FieldValidationResult, Severity, ValidationError, WorkflowValidation};

/// Validate structure and every node, aggregating all findings.
///
/// Structural errors come first, followed by node field errors in node order.
pub fn validate_workflow(nodes: &[Node], edges: &[Edge]) -> WorkflowValidation {
  let mut errors = validate_structure(nodes, edges);
  let node_results: Vec<_> = nodes.iter().map(validate_node).collect();

  for (node, result) in nodes.iter().zip(&node_results) {
    if result.is_valid {
      continue;
    }
    let display = format!("{} {}", node.display_name(), node.id);
    for field_error in &result.errors {
      errors.push(ValidationError {
        id: format!("{}_{}", node.id, field_error.field),
        severity: Severity::Error,
        message: aggregated_message(field_error),
        node_id: Some(display.clone()),
      });
    }
  }

  debug!(
    nodes = nodes.len(),
    edges = edges.len(),
    errors = errors.len(),
    "validated workflow"
  );

  WorkflowValidation {
    is_valid: errors.is_empty(),
    errors,
    node_results,
  }
}

/// Validate a [`WorkflowGraph`].
pub fn validate_graph(graph: &WorkflowGraph) -> WorkflowValidation {
  validate_workflow(&graph.nodes, &graph.edges)
}

/// Nested form field errors are prefixed with the 1-based field number.
fn aggregated_message(field_error: &FieldValidationResult) -> String {
  let message = field_error.error.as_deref().unwrap_or("Unknown error");
  match field_error.form_field_index() {
    Some(index) => format!("Field {}: {}", index + 1, message),
    None => message.to_string(),
  }
}
