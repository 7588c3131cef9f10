//! One-shot result delivery with at-most-once semantics
//!
//! Several sources race to finish a flow: navigation events, the window
//! close handler, the deadline. Whichever fires first must win, and every
//! later delivery must be a no-op. The channel wraps a oneshot sender in a
//! shared slot so racing holders can all try to deliver safely.

use crate::flow::types::AuthResult;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

/// One-shot channel for the terminal result of a flow invocation
pub struct ResultChannel;

impl ResultChannel {
    /// Create a linked sender/waiter pair
    pub fn create() -> (ResultSender, ResultWaiter) {
        let (tx, rx) = oneshot::channel();
        let sender = ResultSender {
            slot: Arc::new(Mutex::new(Some(tx))),
        };
        (sender, ResultWaiter { rx })
    }
}

/// Delivering half; clones share one at-most-once slot
#[derive(Clone)]
pub struct ResultSender {
    slot: Arc<Mutex<Option<oneshot::Sender<AuthResult>>>>,
}

impl ResultSender {
    /// Deliver the terminal result
    ///
    /// Only the first call across all clones has effect. Returns whether
    /// this call was the one that delivered.
    pub fn deliver(&self, result: AuthResult) -> bool {
        let sender = self.slot.lock().take();
        match sender {
            Some(tx) => {
                if tx.send(result).is_err() {
                    debug!("Auth result delivered after the caller went away");
                }
                true
            }
            None => false,
        }
    }

    /// Deliver a cancellation; subject to the same at-most-once rule
    pub fn cancel(&self) -> bool {
        self.deliver(AuthResult::Canceled)
    }

    /// Whether a result has already been delivered
    pub fn delivered(&self) -> bool {
        self.slot.lock().is_none()
    }
}

/// Awaiting half; suspends the caller until a result is delivered
pub struct ResultWaiter {
    rx: oneshot::Receiver<AuthResult>,
}

impl ResultWaiter {
    /// Wait for the terminal result
    ///
    /// All sender clones dropping without a delivery counts as abandonment
    /// and resolves to `Canceled`.
    pub async fn wait(self) -> AuthResult {
        self.rx.await.unwrap_or(AuthResult::Canceled)
    }
}
