//! Capacity-one handoff slot.

use std::sync::Mutex;

use tokio::sync::Notify;

use crate::error::{SessionError, SessionResult};
use crate::transport::EndpointId;

#[derive(Debug, Default)]
struct SlotInner {
    value: Option<EndpointId>,
    closed: bool,
}

/// Capacity-one exchange point between the session driver and callers.
///
/// Holds at most one endpoint, representing a connection that has been
/// established but not yet claimed by a caller blocked in
/// `establish_connection`. Thread-safe without external locking.
#[derive(Debug, Default)]
pub struct HandoffSlot {
    inner: Mutex<SlotInner>,
    notify: Notify,
}

impl HandoffSlot {
    /// Create an empty, open slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an endpoint, waiting while the slot is occupied.
    ///
    /// The state machine only publishes after checking emptiness, so this
    /// never actually waits; the primitive still blocks on a full slot by
    /// construction. Publishing to a closed slot drops the value.
    pub async fn publish(&self, endpoint: EndpointId) {
        let mut endpoint = Some(endpoint);
        loop {
            let notified = self.notify.notified();
            {
                let mut inner = self.inner.lock().unwrap();
                if inner.closed {
                    return;
                }
                if inner.value.is_none() {
                    inner.value = endpoint.take();
                    drop(inner);
                    self.notify.notify_waiters();
                    return;
                }
            }
            notified.await;
        }
    }

    /// Take the published endpoint, waiting until one is available.
    ///
    /// Single-consumer: the session supports one concurrent caller of
    /// `establish_connection`. Returns `Err(Closed)` if the slot is closed
    /// while waiting.
    pub async fn take(&self) -> SessionResult<EndpointId> {
        loop {
            let notified = self.notify.notified();
            {
                let mut inner = self.inner.lock().unwrap();
                if let Some(endpoint) = inner.value.take() {
                    drop(inner);
                    self.notify.notify_waiters();
                    return Ok(endpoint);
                }
                if inner.closed {
                    return Err(SessionError::Closed);
                }
            }
            notified.await;
        }
    }

    /// Empty the slot unconditionally. Used on reset.
    pub fn clear(&self) {
        self.inner.lock().unwrap().value = None;
        self.notify.notify_waiters();
    }

    /// Close the slot, waking blocked takers with `Err(Closed)`.
    pub fn close(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.closed = true;
        inner.value = None;
        drop(inner);
        self.notify.notify_waiters();
    }

    /// Reopen a closed slot so the session can be re-armed.
    pub fn reopen(&self) {
        self.inner.lock().unwrap().closed = false;
    }

    /// Check whether the slot currently holds a value.
    ///
    /// Non-emptiness means a connection was established and not yet claimed;
    /// the state machine uses this to reject further connection offers.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().value.is_none()
    }
}
