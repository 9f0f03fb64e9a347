//! Per-session node id generation.

use std::sync::LazyLock;

use regex::Regex;

static NODE_ID: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"node_(\d+)").expect("node id pattern is valid"));

/// Hands out `node_<n>` ids, scoped to one editor session.
#[derive(Debug, Clone, Default)]
pub struct NodeIdGenerator {
  next: u64,
}

impl NodeIdGenerator {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn next_id(&mut self) -> String {
    let id = format!("node_{}", self.next);
    self.next = self.next.saturating_add(1);
    id
  }

  /// The id the next call to [`next_id`](Self::next_id) returns.
  pub fn peek(&self) -> String {
    format!("node_{}", self.next)
  }

  /// Continue numbering after the largest `node_<n>` suffix in `ids`.
  ///
  /// Ids without a numeric suffix count as 0, so seeding from an empty or
  /// foreign set of ids continues at `node_1`. Suffixes too large for a
  /// `u64` saturate.
  pub fn seed_from<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
    let max = ids
      .into_iter()
      .map(|id| {
        NODE_ID
          .captures(id)
          .map(|caps| caps[1].parse::<u64>().unwrap_or(u64::MAX))
          .unwrap_or(0)
      })
      .max()
      .unwrap_or(0);
    self.next = max.saturating_add(1);
  }
}
