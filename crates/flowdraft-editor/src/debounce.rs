//! Cancel-and-restart timers.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Runs an action once input has been quiet for a fixed window.
///
/// Each call to [`schedule`](Debouncer::schedule) cancels the pending timer
/// and starts a new one, so only the timer that survives the full window
/// fires. Timers never stack.
///
/// Every timer is a child of the `parent` token: cancelling the parent (when
/// the editor closes) drops all pending work. Cancellation only stops the
/// wait; an action that has already started runs to completion, so a write in
/// flight is never cut short by a newer edit.
///
/// Timers are spawned onto the current tokio runtime, so scheduling must
/// happen from within one.
#[derive(Debug)]
pub struct Debouncer {
  delay: Duration,
  parent: CancellationToken,
  pending: Mutex<Option<CancellationToken>>,
}

impl Debouncer {
  pub fn new(delay: Duration, parent: CancellationToken) -> Self {
    Self {
      delay,
      parent,
      pending: Mutex::new(None),
    }
  }

  pub fn delay(&self) -> Duration {
    self.delay
  }

  /// Restart the timer with the default delay.
  pub fn schedule<F>(&self, action: F)
  where
    F: Future<Output = ()> + Send + 'static,
  {
    self.schedule_after(self.delay, action);
  }

  /// Restart the timer with an explicit delay.
  pub fn schedule_after<F>(&self, delay: Duration, action: F)
  where
    F: Future<Output = ()> + Send + 'static,
  {
    let token = self.parent.child_token();
    if let Some(previous) = self.swap(Some(token.clone())) {
      previous.cancel();
    }

    tokio::spawn(async move {
      tokio::select! {
          _ = token.cancelled() => return,
          _ = tokio::time::sleep(delay) => {}
      }
      action.await;
    });
  }

  /// Cancel the pending timer, if any.
  pub fn cancel(&self) {
    if let Some(previous) = self.swap(None) {
      previous.cancel();
    }
  }

  fn swap(&self, next: Option<CancellationToken>) -> Option<CancellationToken> {
    let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *pending, next)
  }
}

impl Drop for Debouncer {
  fn drop(&mut self) {
    self.cancel();
  }
}
