//! Validation result types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Error,
}

/// A workflow-level or node-level problem, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
  pub id: String,
  #[serde(rename = "type")]
  pub severity: Severity,
  pub message: String,
  /// Display reference of the offending node: `"<name> <node id>"`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub node_id: Option<String>,
}

impl ValidationError {
  pub fn workflow(id: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      severity: Severity::Error,
      message: message.into(),
      node_id: None,
    }
  }
}

/// Outcome of one field rule. `field` is a dotted path such as `fields.0.name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidationResult {
  pub field: String,
  pub is_valid: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl FieldValidationResult {
  pub fn invalid(field: impl Into<String>, error: impl Into<String>) -> Self {
    Self {
      field: field.into(),
      is_valid: false,
      error: Some(error.into()),
    }
  }

  /// Index of the form field this result belongs to, for `fields.<i>.*` paths.
  pub fn form_field_index(&self) -> Option<usize> {
    let mut parts = self.field.split('.');
    match (parts.next(), parts.next()) {
      (Some("fields"), Some(index)) => index.parse().ok(),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeValidationResult {
  pub node_id: String,
  pub is_valid: bool,
  pub errors: Vec<FieldValidationResult>,
}

/// Aggregated result of validating a whole workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowValidation {
  pub is_valid: bool,
  pub errors: Vec<ValidationError>,
  pub node_results: Vec<NodeValidationResult>,
}

impl WorkflowValidation {
  /// Field errors keyed by node id, for nodes that are currently invalid.
  pub fn node_errors(&self) -> HashMap<String, Vec<FieldValidationResult>> {
    self
      .node_results
      .iter()
      .filter(|r| !r.is_valid)
      .map(|r| (r.node_id.clone(), r.errors.clone()))
      .collect()
  }

  pub fn messages(&self) -> Vec<&str> {
    self.errors.iter().map(|e| e.message.as_str()).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_form_field_index() {
    assert_eq!(
      FieldValidationResult::invalid("fields.3.label", "x").form_field_index(),
      Some(3)
    );
    assert_eq!(FieldValidationResult::invalid("customName", "x").form_field_index(), None);
    assert_eq!(FieldValidationResult::invalid("fields.x.name", "x").form_field_index(), None);
  }

  #[test]
  fn test_validation_error_wire_format() {
    let error = ValidationError::workflow("validation-0", "All nodes must be connected");
    let value = serde_json::to_value(&error).unwrap();
    assert_eq!(value["type"], "error");
    assert!(value.get("nodeId").is_none());
  }
}
