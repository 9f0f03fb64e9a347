//! Per-node field rules, dispatched on the node type.

use std::sync::LazyLock;

use flowdraft_config::{ApiData, ConditionalData, FormData, Node, NodeData, RouteId};
use regex::Regex;

use crate::types::{FieldValidationResult, NodeValidationResult};

static FIELD_NAME: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("field name pattern is valid"));

static HTTP_URL: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^https?://.+").expect("url pattern is valid"));

const MIN_NAME_LEN: usize = 3;
const MIN_FIELD_LEN: usize = 2;

/// Validate a node's data against the rules for its type.
///
/// Every failing rule is reported; a single field may collect more than one
/// error (an empty form field name is both too short and not alphanumeric).
pub fn validate_node(node: &Node) -> NodeValidationResult {
  let mut errors = FieldErrors::default();

  match &node.data {
    NodeData::Form(form) => check_form(form, &mut errors),
    NodeData::Conditional(conditional) => check_conditional(conditional, &mut errors),
    NodeData::Api(api) => check_api(api, &mut errors),
    NodeData::Start(_) | NodeData::End(_) => {}
  }

  let errors = errors.into_inner();
  NodeValidationResult {
    node_id: node.id.clone(),
    is_valid: errors.is_empty(),
    errors,
  }
}

#[derive(Default)]
struct FieldErrors(Vec<FieldValidationResult>);

impl FieldErrors {
  fn push(&mut self, field: impl Into<String>, message: &str) {
    self.0.push(FieldValidationResult::invalid(field, message));
  }

  fn into_inner(self) -> Vec<FieldValidationResult> {
    self.0
  }
}

fn char_len(s: &str) -> usize {
  s.chars().count()
}

fn check_form(form: &FormData, errors: &mut FieldErrors) {
  if char_len(&form.custom_name) < MIN_NAME_LEN {
    errors.push("customName", "Form name must be at least 3 characters");
  }

  for (index, field) in form.fields.iter().enumerate() {
    let name_path = format!("fields.{}.name", index);
    if char_len(&field.name) < MIN_FIELD_LEN {
      errors.push(name_path.as_str(), "Field name must be at least 2 characters");
    }
    if !FIELD_NAME.is_match(&field.name) {
      errors.push(name_path, "Field name must be alphanumeric only (no spaces)");
    }
    if char_len(&field.label) < MIN_FIELD_LEN {
      errors.push(
        format!("fields.{}.label", index),
        "Field label must be at least 2 characters",
      );
    }
  }
}

fn check_conditional(conditional: &ConditionalData, errors: &mut FieldErrors) {
  if char_len(&conditional.custom_name) < MIN_NAME_LEN {
    errors.push("customName", "Condition name must be at least 3 characters");
  }
  if conditional.field_to_evaluate.is_empty() {
    errors.push("fieldToEvaluate", "Field to evaluate is required");
  }

  if conditional.operator.requires_value() {
    let has_value = conditional
      .value
      .as_deref()
      .is_some_and(|v| !v.trim().is_empty());
    if !has_value {
      errors.push("value", "Value is required for this operator");
    }
  }

  if !conditional.routes.is_empty() {
    let count = |id: RouteId| conditional.routes.iter().filter(|r| r.id == id).count();
    if count(RouteId::True) != 1 || count(RouteId::False) != 1 {
      errors.push(
        "routes",
        "Conditional must have exactly one true and one false route",
      );
    }
  }
}

fn check_api(api: &ApiData, errors: &mut FieldErrors) {
  if api.url.is_empty() {
    errors.push("url", "URL is required");
  }
  if !HTTP_URL.is_match(&api.url) {
    errors.push("url", "URL must start with http:// or https://");
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use flowdraft_config::{
    ConditionalOperator, FieldType, FormField, HttpMethod, NodeKind, Position, Route,
  };

  fn form_node(custom_name: &str, fields: Vec<FormField>) -> Node {
    Node::new(
      "node_1",
      Position::default(),
      NodeData::Form(FormData {
        label: "Form".to_string(),
        custom_name: custom_name.to_string(),
        fields,
      }),
    )
  }

  fn field(name: &str, label: &str) -> FormField {
    FormField {
      id: format!("field-{}", name),
      name: name.to_string(),
      label: label.to_string(),
      field_type: FieldType::String,
      required: true,
      options: None,
    }
  }

  fn conditional_node(operator: ConditionalOperator, value: Option<&str>) -> Node {
    let NodeData::Conditional(mut data) = NodeData::default_for(NodeKind::Conditional) else {
      unreachable!()
    };
    data.custom_name = "Age check".to_string();
    data.field_to_evaluate = "age".to_string();
    data.operator = operator;
    data.value = value.map(str::to_string);
    Node::new("node_2", Position::default(), NodeData::Conditional(data))
  }

  fn api_node(url: &str) -> Node {
    Node::new(
      "node_3",
      Position::default(),
      NodeData::Api(ApiData {
        label: "API Call".to_string(),
        url: url.to_string(),
        method: HttpMethod::Post,
      }),
    )
  }

  fn fields_of(result: &NodeValidationResult) -> Vec<&str> {
    result.errors.iter().map(|e| e.field.as_str()).collect()
  }

  #[test]
  fn test_start_and_end_are_always_valid() {
    for kind in [NodeKind::Start, NodeKind::End] {
      let node = Node::with_defaults("n", kind, Position::default());
      assert!(validate_node(&node).is_valid);
    }
  }

  #[test]
  fn test_form_name_with_space() {
    let result = validate_node(&form_node("Signup", vec![field("user name", "User")]));
    assert!(!result.is_valid);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].field, "fields.0.name");
    assert_eq!(
      result.errors[0].error.as_deref(),
      Some("Field name must be alphanumeric only (no spaces)")
    );
  }

  #[test]
  fn test_form_empty_field_name_reports_both_rules() {
    let result = validate_node(&form_node("Signup", vec![field("", "Name")]));
    assert_eq!(fields_of(&result), vec!["fields.0.name", "fields.0.name"]);
  }

  #[test]
  fn test_form_short_custom_name_and_label() {
    let result = validate_node(&form_node("ab", vec![field("email", "E")]));
    assert_eq!(fields_of(&result), vec!["customName", "fields.0.label"]);
  }

  #[test]
  fn test_form_without_fields_is_valid() {
    assert!(validate_node(&form_node("Signup", vec![])).is_valid);
  }

  #[test]
  fn test_form_dropdown_without_options_is_valid() {
    let mut dropdown = field("country", "Country");
    dropdown.field_type = FieldType::Dropdown;
    dropdown.options = Some(vec![]);
    assert!(validate_node(&form_node("Signup", vec![dropdown])).is_valid);
  }

  #[test]
  fn test_conditional_is_empty_needs_no_value() {
    let result = validate_node(&conditional_node(ConditionalOperator::IsEmpty, None));
    assert!(result.is_valid, "{:?}", result.errors);

    let result = validate_node(&conditional_node(ConditionalOperator::IsEmpty, Some("")));
    assert!(result.is_valid);
  }

  #[test]
  fn test_conditional_value_required_for_other_operators() {
    for operator in [
      ConditionalOperator::Equals,
      ConditionalOperator::NotEquals,
      ConditionalOperator::GreaterThan,
      ConditionalOperator::LessThan,
      ConditionalOperator::Contains,
    ] {
      for value in [None, Some(""), Some("   ")] {
        let result = validate_node(&conditional_node(operator, value));
        assert_eq!(fields_of(&result), vec!["value"], "{:?} {:?}", operator, value);
      }
      assert!(validate_node(&conditional_node(operator, Some("18"))).is_valid);
    }
  }

  #[test]
  fn test_conditional_missing_field_to_evaluate() {
    let mut node = conditional_node(ConditionalOperator::Equals, Some("x"));
    if let NodeData::Conditional(data) = &mut node.data {
      data.field_to_evaluate.clear();
      data.custom_name = "no".to_string();
    }
    let result = validate_node(&node);
    assert_eq!(fields_of(&result), vec!["customName", "fieldToEvaluate"]);
  }

  #[test]
  fn test_conditional_duplicate_route() {
    let mut node = conditional_node(ConditionalOperator::Equals, Some("x"));
    if let NodeData::Conditional(data) = &mut node.data {
      data.routes = vec![
        Route {
          id: RouteId::True,
          label: "True".to_string(),
          condition: None,
        },
        Route {
          id: RouteId::True,
          label: "Also true".to_string(),
          condition: None,
        },
      ];
    }
    assert_eq!(fields_of(&validate_node(&node)), vec!["routes"]);

    if let NodeData::Conditional(data) = &mut node.data {
      data.routes.clear();
    }
    assert!(validate_node(&node).is_valid);
  }

  #[test]
  fn test_api_url_rules() {
    assert!(validate_node(&api_node("https://example.com/hook")).is_valid);
    assert!(validate_node(&api_node("http://localhost:8080")).is_valid);

    let empty = validate_node(&api_node(""));
    assert_eq!(fields_of(&empty), vec!["url", "url"]);
    assert_eq!(empty.errors[0].error.as_deref(), Some("URL is required"));

    let ftp = validate_node(&api_node("ftp://example.com"));
    assert_eq!(
      ftp.errors[0].error.as_deref(),
      Some("URL must start with http:// or https://")
    );

    // The scheme prefix is case-sensitive.
    assert!(!validate_node(&api_node("HTTPS://example.com")).is_valid);
    assert!(!validate_node(&api_node("https://")).is_valid);
  }
}
