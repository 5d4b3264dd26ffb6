//! Inbound payload queue.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::Notify;

use crate::error::{SessionError, SessionResult};

#[derive(Debug, Default)]
struct InboxInner {
    queue: VecDeque<Vec<u8>>,
    closed: bool,
}

/// Unbounded FIFO of received payloads.
///
/// Insertion order is delivery order is consumption order. No backpressure:
/// the queue accepts whatever rate the substrate delivers. Thread-safe
/// without external locking.
#[derive(Debug, Default)]
pub struct PayloadInbox {
    inner: Mutex<InboxInner>,
    notify: Notify,
}

impl PayloadInbox {
    /// Create an empty, open inbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a payload. Never blocks. Pushing to a closed inbox drops the
    /// payload.
    pub fn push(&self, bytes: Vec<u8>) {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return;
        }
        inner.queue.push_back(bytes);
        drop(inner);
        self.notify.notify_waiters();
    }

    /// Take the oldest payload, waiting until one is available.
    ///
    /// Returns `Err(Closed)` if the inbox is closed while waiting.
    pub async fn take(&self) -> SessionResult<Vec<u8>> {
        loop {
            let notified = self.notify.notified();
            {
                let mut inner = self.inner.lock().unwrap();
                if let Some(bytes) = inner.queue.pop_front() {
                    return Ok(bytes);
                }
                if inner.closed {
                    return Err(SessionError::Closed);
                }
            }
            notified.await;
        }
    }

    /// Drain all pending payloads. Used on reset.
    pub fn clear(&self) {
        self.inner.lock().unwrap().queue.clear();
    }

    /// Close the inbox, waking blocked takers with `Err(Closed)`.
    pub fn close(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.closed = true;
        inner.queue.clear();
        drop(inner);
        self.notify.notify_waiters();
    }

    /// Reopen a closed inbox so the session can be re-armed.
    pub fn reopen(&self) {
        self.inner.lock().unwrap().closed = false;
    }

    /// Number of payloads currently queued.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().queue.len()
    }

    /// Whether no payloads are queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
