//! Editing operations and restore flow of an editor session.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use flowdraft_config::{
  ApiData, Edge, HttpMethod, Node, NodeData, NodeKind, Position, Snapshot, WorkflowGraph,
};
use flowdraft_editor::{EXPORT_NAME, EditorConfig, EditorError, EditorSession, SaveState};
use flowdraft_store::{DEFAULT_KEY, KvFuture, KvStore};

#[derive(Clone, Default)]
struct SharedKvStore {
  data: Arc<Mutex<HashMap<String, String>>>,
}

impl SharedKvStore {
  fn value(&self) -> Option<String> {
    self.data.lock().unwrap().get(DEFAULT_KEY).cloned()
  }

  fn seeded(graph: &WorkflowGraph) -> Self {
    let store = Self::default();
    let record = serde_json::to_string(&Snapshot::new(graph, Utc::now())).unwrap();
    store
      .data
      .lock()
      .unwrap()
      .insert(DEFAULT_KEY.to_string(), record);
    store
  }
}

impl KvStore for SharedKvStore {
  fn get(&self, key: &str) -> KvFuture<'_, Option<String>> {
    let value = self.data.lock().unwrap().get(key).cloned();
    Box::pin(async move { Ok(value) })
  }

  fn set(&mut self, key: &str, value: String) -> KvFuture<'_, ()> {
    self.data.lock().unwrap().insert(key.to_string(), value);
    Box::pin(async { Ok(()) })
  }

  fn delete(&mut self, key: &str) -> KvFuture<'_, ()> {
    self.data.lock().unwrap().remove(key);
    Box::pin(async { Ok(()) })
  }
}

async fn open(kv: SharedKvStore) -> EditorSession<SharedKvStore> {
  EditorSession::open(kv, &EditorConfig::default()).await
}

fn restored_graph() -> WorkflowGraph {
  WorkflowGraph::new(
    vec![
      Node::with_defaults("node_3", NodeKind::Start, Position::default()),
      Node::with_defaults("node_7", NodeKind::End, Position::new(100.0, 300.0)),
    ],
    vec![Edge::new("edge-node_3-node_7", "node_3", "node_7")],
  )
}

#[tokio::test(start_paused = true)]
async fn test_restore_continues_node_numbering() {
  let mut session = open(SharedKvStore::seeded(&restored_graph())).await;
  assert!(session.offer_restore());

  assert!(session.restore().await);
  assert_eq!(session.graph(), &restored_graph());
  assert!(!session.offer_restore());

  assert_eq!(session.add_node(NodeKind::Form, None), "node_8");
}

#[tokio::test(start_paused = true)]
async fn test_restore_offered_only_for_empty_canvas() {
  let mut session = open(SharedKvStore::seeded(&restored_graph())).await;
  session.add_node(NodeKind::Start, None);

  assert!(session.has_saved_data());
  assert!(!session.offer_restore());

  let fresh = open(SharedKvStore::default()).await;
  assert!(!fresh.offer_restore());
}

#[tokio::test(start_paused = true)]
async fn test_discard_erases_saved_workflow() {
  let kv = SharedKvStore::seeded(&restored_graph());
  let mut session = open(kv.clone()).await;

  session.discard().await;

  assert!(!session.offer_restore());
  assert!(!session.has_saved_data());
  assert!(kv.value().is_none());
  assert!(!session.restore().await);
  assert!(session.graph().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_edits_are_auto_saved() {
  let kv = SharedKvStore::default();
  let mut session = open(kv.clone()).await;

  let start = session.add_node(NodeKind::Start, None);
  let end = session.add_node(NodeKind::End, Some(Position::new(100.0, 300.0)));
  session.connect(&start, &end, None).unwrap();
  tokio::time::sleep(Duration::from_millis(2_100)).await;

  assert_eq!(session.save_status().state, SaveState::Saved);
  let stored: Snapshot = serde_json::from_str(&kv.value().unwrap()).unwrap();
  assert_eq!(stored.into_graph(), *session.graph());
}

#[tokio::test(start_paused = true)]
async fn test_manual_save_requires_valid_workflow() {
  let mut session = open(SharedKvStore::default()).await;
  let start = session.add_node(NodeKind::Start, None);
  tokio::time::sleep(Duration::from_millis(1_100)).await;

  assert!(!session.is_workflow_valid());
  let err = session.save().unwrap_err();
  assert!(matches!(err, EditorError::InvalidWorkflow { error_count: 1 }));

  let end = session.add_node(NodeKind::End, None);
  session.connect(&start, &end, None).unwrap();
  tokio::time::sleep(Duration::from_millis(1_100)).await;

  let export = session.save().unwrap();
  assert_eq!(export.metadata.name, EXPORT_NAME);
  assert_eq!(export.metadata.version, "1.0.0");
  assert_eq!(export.nodes.len(), 2);
  assert_eq!(export.edges[0].id, format!("edge-{}-{}", start, end));
}

#[tokio::test(start_paused = true)]
async fn test_conditional_edges_carry_route_labels() {
  let mut session = open(SharedKvStore::default()).await;
  let branch = session.add_node(NodeKind::Conditional, None);
  let yes = session.add_node(NodeKind::Api, None);
  let no = session.add_node(NodeKind::End, None);

  let true_edge = session.connect(&branch, &yes, Some("true")).unwrap();
  let false_edge = session.connect(&branch, &no, Some("false")).unwrap();
  let plain = session.connect(&yes, &no, None).unwrap();
  let duplicate = session.connect(&yes, &no, None).unwrap();

  let label = |id: &str| session.graph().edge(id).unwrap().label.clone();
  assert_eq!(label(&true_edge).as_deref(), Some("True"));
  assert_eq!(label(&false_edge).as_deref(), Some("False"));
  assert_eq!(label(&plain), None);

  assert_eq!(true_edge, format!("edge-{}-{}-true", branch, yes));
  assert_eq!(duplicate, plain, "repeated connection reuses the edge");
  assert_eq!(session.graph().edges.len(), 3);
  assert_eq!(
    session.graph().edge(&false_edge).unwrap().source_handle.as_deref(),
    Some("false")
  );
}

#[tokio::test(start_paused = true)]
async fn test_edge_id_avoids_foreign_id_clash() {
  let mut session = open(SharedKvStore::default()).await;
  session.replace_graph(WorkflowGraph::new(
    vec![
      Node::with_defaults("node_0", NodeKind::Start, Position::default()),
      Node::with_defaults("node_1", NodeKind::End, Position::default()),
    ],
    vec![Edge::new("edge-node_0-node_1", "node_1", "node_0")],
  ));

  let id = session.connect("node_0", "node_1", None).unwrap();
  assert_eq!(id, "edge-node_0-node_1-1");
  assert_eq!(session.graph().edges.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_fresh_session_reports_empty_canvas_invalid() {
  let kv = SharedKvStore::default();
  let session = open(kv.clone()).await;
  tokio::time::sleep(Duration::from_millis(1_100)).await;

  assert!(!session.is_workflow_valid());
  assert_eq!(session.validation_state().errors.len(), 2);
  assert!(matches!(
    session.save(),
    Err(EditorError::InvalidWorkflow { error_count: 2 })
  ));

  tokio::time::sleep(Duration::from_secs(5)).await;
  assert!(kv.value().is_none(), "empty canvas is never auto-saved");
}

#[tokio::test(start_paused = true)]
async fn test_connect_requires_both_nodes() {
  let mut session = open(SharedKvStore::default()).await;
  let start = session.add_node(NodeKind::Start, None);

  let err = session.connect(&start, "node_99", None).unwrap_err();
  assert!(matches!(err, EditorError::NodeNotFound { node_id } if node_id == "node_99"));
  assert!(session.graph().edges.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_delete_node_removes_edges_and_selection() {
  let mut session = open(SharedKvStore::default()).await;
  let start = session.add_node(NodeKind::Start, None);
  let form = session.add_node(NodeKind::Form, None);
  let end = session.add_node(NodeKind::End, None);
  session.connect(&start, &form, None).unwrap();
  session.connect(&form, &end, None).unwrap();
  session.select_node(&form).unwrap();

  session.delete_node(&form).unwrap();

  assert!(session.graph().edges.is_empty());
  assert!(session.selected_node().is_none());
  assert_eq!(session.graph().nodes.len(), 2);
  assert!(matches!(
    session.delete_node(&form),
    Err(EditorError::NodeNotFound { .. })
  ));
}

#[tokio::test(start_paused = true)]
async fn test_start_and_end_are_not_editable() {
  let mut session = open(SharedKvStore::default()).await;
  let start = session.add_node(NodeKind::Start, None);
  let api = session.add_node(NodeKind::Api, None);

  assert!(matches!(
    session.select_node(&start),
    Err(EditorError::NotEditable {
      kind: NodeKind::Start,
      ..
    })
  ));

  session.select_node(&api).unwrap();
  assert_eq!(session.selected_node().unwrap().id, api);
}

#[tokio::test(start_paused = true)]
async fn test_selected_node_errors_follow_validation() {
  let mut session = open(SharedKvStore::default()).await;
  let api = session.add_node(NodeKind::Api, None);
  session.select_node(&api).unwrap();
  assert!(session.selected_node_errors().is_empty());

  tokio::time::sleep(Duration::from_millis(1_100)).await;
  let errors = session.selected_node_errors();
  assert_eq!(errors.len(), 2);
  assert!(errors.iter().all(|e| e.field == "url"));

  let data = NodeData::Api(ApiData {
    label: "API Call".to_string(),
    url: "https://example.com/hook".to_string(),
    method: HttpMethod::Post,
  });
  session.update_node_data(&api, data).unwrap();
  tokio::time::sleep(Duration::from_millis(1_100)).await;
  assert!(session.selected_node_errors().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_update_rejects_other_node_kind() {
  let mut session = open(SharedKvStore::default()).await;
  let form = session.add_node(NodeKind::Form, None);

  let err = session
    .update_node_data(&form, NodeData::default_for(NodeKind::Api))
    .unwrap_err();
  assert!(matches!(
    err,
    EditorError::KindMismatch {
      expected: NodeKind::Form,
      actual: NodeKind::Api,
      ..
    }
  ));

  session.move_node(&form, Position::new(40.0, 80.0)).unwrap();
  assert_eq!(
    session.graph().node(&form).unwrap().position,
    Position::new(40.0, 80.0)
  );
}

#[tokio::test(start_paused = true)]
async fn test_close_cancels_pending_work() {
  let kv = SharedKvStore::default();
  let mut session = open(kv.clone()).await;
  let start = session.add_node(NodeKind::Start, None);
  let end = session.add_node(NodeKind::End, None);
  session.connect(&start, &end, None).unwrap();

  session.close();
  tokio::time::sleep(Duration::from_secs(5)).await;

  assert!(kv.value().is_none());
  assert_eq!(session.save_status().state, SaveState::Idle);

  // Edits after closing schedule nothing.
  session.add_node(NodeKind::Form, None);
  tokio::time::sleep(Duration::from_secs(5)).await;
  assert!(kv.value().is_none());
}
