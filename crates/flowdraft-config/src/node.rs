use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ConfigError;

/// Canvas coordinates of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
  pub x: f64,
  pub y: f64,
}

impl Position {
  pub fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }
}

impl Default for Position {
  fn default() -> Self {
    Self { x: 100.0, y: 100.0 }
  }
}

/// The five node types a workflow can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
  Start,
  Form,
  Conditional,
  Api,
  End,
}

impl NodeKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      NodeKind::Start => "start",
      NodeKind::Form => "form",
      NodeKind::Conditional => "conditional",
      NodeKind::Api => "api",
      NodeKind::End => "end",
    }
  }

  /// Start and end nodes carry only a label and have nothing to edit.
  pub fn has_field_schema(&self) -> bool {
    !matches!(self, NodeKind::Start | NodeKind::End)
  }
}

impl fmt::Display for NodeKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Data for start and end nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelData {
  #[serde(default)]
  pub label: String,
}

/// Input type of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
  String,
  Number,
  Dropdown,
  Checkbox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
  pub id: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub label: String,
  #[serde(rename = "type")]
  pub field_type: FieldType,
  #[serde(default)]
  pub required: bool,
  /// Choices for dropdown fields. No minimum count is enforced.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
  #[serde(default)]
  pub label: String,
  #[serde(default)]
  pub custom_name: String,
  #[serde(default)]
  pub fields: Vec<FormField>,
}

/// Comparison applied by a conditional node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionalOperator {
  Equals,
  NotEquals,
  GreaterThan,
  LessThan,
  Contains,
  IsEmpty,
}

impl ConditionalOperator {
  /// Every operator except `is_empty` compares against a value.
  pub fn requires_value(&self) -> bool {
    !matches!(self, ConditionalOperator::IsEmpty)
  }
}

/// Identifier of one of the two outgoing branches of a conditional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteId {
  True,
  False,
}

impl RouteId {
  pub fn as_str(&self) -> &'static str {
    match self {
      RouteId::True => "true",
      RouteId::False => "false",
    }
  }

  /// Parse a source handle name into a route id.
  pub fn from_handle(handle: &str) -> Option<Self> {
    match handle {
      "true" => Some(RouteId::True),
      "false" => Some(RouteId::False),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
  pub id: RouteId,
  #[serde(default)]
  pub label: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalData {
  #[serde(default)]
  pub label: String,
  #[serde(default)]
  pub custom_name: String,
  #[serde(default)]
  pub field_to_evaluate: String,
  pub operator: ConditionalOperator,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub value: Option<String>,
  #[serde(default)]
  pub routes: Vec<Route>,
}

impl ConditionalData {
  pub fn route(&self, id: RouteId) -> Option<&Route> {
    self.routes.iter().find(|r| r.id == id)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
  Get,
  Post,
  Put,
  Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiData {
  #[serde(default)]
  pub label: String,
  #[serde(default)]
  pub url: String,
  pub method: HttpMethod,
}

/// Type-specific node payload.
///
/// Serialized without a tag: the owning [`Node`] writes the discriminant as
/// its `type` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NodeData {
  Start(LabelData),
  Form(FormData),
  Conditional(ConditionalData),
  Api(ApiData),
  End(LabelData),
}

impl NodeData {
  pub fn kind(&self) -> NodeKind {
    match self {
      NodeData::Start(_) => NodeKind::Start,
      NodeData::Form(_) => NodeKind::Form,
      NodeData::Conditional(_) => NodeKind::Conditional,
      NodeData::Api(_) => NodeKind::Api,
      NodeData::End(_) => NodeKind::End,
    }
  }

  pub fn label(&self) -> &str {
    match self {
      NodeData::Start(d) | NodeData::End(d) => &d.label,
      NodeData::Form(d) => &d.label,
      NodeData::Conditional(d) => &d.label,
      NodeData::Api(d) => &d.label,
    }
  }

  pub fn custom_name(&self) -> Option<&str> {
    match self {
      NodeData::Form(d) => Some(&d.custom_name),
      NodeData::Conditional(d) => Some(&d.custom_name),
      _ => None,
    }
  }

  /// The data a freshly added block of the given kind starts with.
  pub fn default_for(kind: NodeKind) -> Self {
    match kind {
      NodeKind::Start => NodeData::Start(LabelData {
        label: "Start".to_string(),
      }),
      NodeKind::Form => NodeData::Form(FormData {
        label: "Form".to_string(),
        custom_name: "Form".to_string(),
        fields: Vec::new(),
      }),
      NodeKind::Conditional => NodeData::Conditional(ConditionalData {
        label: "Conditional".to_string(),
        custom_name: "Conditional".to_string(),
        field_to_evaluate: String::new(),
        operator: ConditionalOperator::Equals,
        value: Some(String::new()),
        routes: vec![
          Route {
            id: RouteId::True,
            label: "True".to_string(),
            condition: Some(String::new()),
          },
          Route {
            id: RouteId::False,
            label: "False".to_string(),
            condition: Some(String::new()),
          },
        ],
      }),
      NodeKind::Api => NodeData::Api(ApiData {
        label: "API Call".to_string(),
        url: String::new(),
        method: HttpMethod::Get,
      }),
      NodeKind::End => NodeData::End(LabelData {
        label: "End".to_string(),
      }),
    }
  }

  /// Decode a raw JSON payload according to the node kind.
  pub fn from_value(
    node_id: &str,
    kind: NodeKind,
    value: serde_json::Value,
  ) -> Result<Self, ConfigError> {
    let wrap = |source| ConfigError::InvalidNodeData {
      node_id: node_id.to_string(),
      kind,
      source,
    };
    let data = match kind {
      NodeKind::Start => NodeData::Start(serde_json::from_value(value).map_err(wrap)?),
      NodeKind::Form => NodeData::Form(serde_json::from_value(value).map_err(wrap)?),
      NodeKind::Conditional => NodeData::Conditional(serde_json::from_value(value).map_err(wrap)?),
      NodeKind::Api => NodeData::Api(serde_json::from_value(value).map_err(wrap)?),
      NodeKind::End => NodeData::End(serde_json::from_value(value).map_err(wrap)?),
    };
    Ok(data)
  }
}

/// A typed unit of workflow logic placed on the canvas.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawNode")]
pub struct Node {
  pub id: String,
  pub position: Position,
  pub data: NodeData,
}

impl Node {
  pub fn new(id: impl Into<String>, position: Position, data: NodeData) -> Self {
    Self {
      id: id.into(),
      position,
      data,
    }
  }

  /// A node of the given kind with its default block data.
  pub fn with_defaults(id: impl Into<String>, kind: NodeKind, position: Position) -> Self {
    Self::new(id, position, NodeData::default_for(kind))
  }

  pub fn kind(&self) -> NodeKind {
    self.data.kind()
  }

  /// Name shown to users: the custom name, else the label, else a placeholder.
  pub fn display_name(&self) -> &str {
    match self.data.custom_name() {
      Some(name) if !name.is_empty() => name,
      _ if !self.data.label().is_empty() => self.data.label(),
      _ => "Untitled Node",
    }
  }
}

/// Wire shape of a node before its data is checked against its type.
#[derive(Deserialize)]
struct RawNode {
  id: String,
  #[serde(rename = "type")]
  kind: NodeKind,
  #[serde(default)]
  position: Position,
  #[serde(default = "empty_object")]
  data: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
  serde_json::Value::Object(serde_json::Map::new())
}

impl TryFrom<RawNode> for Node {
  type Error = ConfigError;

  fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
    let data = NodeData::from_value(&raw.id, raw.kind, raw.data)?;
    Ok(Node {
      id: raw.id,
      position: raw.position,
      data,
    })
  }
}

impl Serialize for Node {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_struct("Node", 4)?;
    state.serialize_field("id", &self.id)?;
    state.serialize_field("type", &self.kind())?;
    state.serialize_field("position", &self.position)?;
    state.serialize_field("data", &self.data)?;
    state.end()
  }
}
