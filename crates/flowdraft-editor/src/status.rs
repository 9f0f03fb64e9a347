//! Save status as shown to the user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Auto-save state machine.
///
/// ```text
/// idle ──debounce fires + valid──▶ saving ──ok──▶ saved ──2s──▶ idle
///                                     └──err──▶ error ──3s──▶ idle
/// ```
/// Any state may enter `saving` again; the display timers never block a new
/// attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveState {
  #[default]
  Idle,
  Saving,
  Saved,
  Error,
}

/// Current save state plus the time of the last successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SaveStatus {
  pub state: SaveState,
  pub last_saved: Option<DateTime<Utc>>,
}

impl SaveStatus {
  /// Status line text, e.g. "Saved just now". Empty while idle.
  pub fn describe(&self, now: DateTime<Utc>) -> String {
    match self.state {
      SaveState::Idle => String::new(),
      SaveState::Saving => "Saving...".to_string(),
      SaveState::Saved => match self.last_saved {
        Some(at) => format!("Saved {}", format_relative_time(at, now)),
        None => "Saved".to_string(),
      },
      SaveState::Error => "Save failed".to_string(),
    }
  }
}

/// Human-friendly distance from `then` to `now`.
///
/// Under 30 seconds reads "just now"; beyond a day the absolute date is shown.
pub fn format_relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
  let seconds = (now - then).num_seconds().max(0);

  if seconds < 30 {
    return "just now".to_string();
  }
  if seconds > 24 * 60 * 60 {
    return then.format("%Y-%m-%d %H:%M").to_string();
  }

  let minutes = (seconds as f64 / 60.0).round() as i64;
  match minutes {
    0..=1 => "1 minute ago".to_string(),
    2..=44 => format!("{} minutes ago", minutes),
    45..=89 => "about 1 hour ago".to_string(),
    _ => format!("about {} hours ago", (minutes as f64 / 60.0).round() as i64),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;

  fn at(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap()
  }

  #[test]
  fn test_relative_time_buckets() {
    let now = at(1_700_000_000_000);
    let ago = |d: Duration| format_relative_time(now - d, now);

    assert_eq!(ago(Duration::seconds(5)), "just now");
    assert_eq!(ago(Duration::seconds(40)), "1 minute ago");
    assert_eq!(ago(Duration::minutes(12)), "12 minutes ago");
    assert_eq!(ago(Duration::minutes(50)), "about 1 hour ago");
    assert_eq!(ago(Duration::hours(5)), "about 5 hours ago");
    assert_eq!(
      ago(Duration::days(3)),
      (now - Duration::days(3)).format("%Y-%m-%d %H:%M").to_string()
    );
  }

  #[test]
  fn test_describe() {
    let now = at(1_700_000_000_000);
    let mut status = SaveStatus::default();
    assert_eq!(status.describe(now), "");

    status.state = SaveState::Saving;
    assert_eq!(status.describe(now), "Saving...");

    status.state = SaveState::Saved;
    status.last_saved = Some(now);
    assert_eq!(status.describe(now), "Saved just now");

    status.state = SaveState::Error;
    assert_eq!(status.describe(now), "Save failed");
  }

  #[test]
  fn test_state_wire_names() {
    assert_eq!(serde_json::to_value(SaveState::Saved).unwrap(), "saved");
    assert_eq!(serde_json::to_value(SaveState::Idle).unwrap(), "idle");
  }
}
