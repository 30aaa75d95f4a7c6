//! In-process fan-out of change notices to per-owner listeners.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::types::sync::{ChangeKind, ChangeNotice};

struct Listener {
    owner_id: String,
    tx: UnboundedSender<ChangeNotice>,
}

#[derive(Default)]
struct HubInner {
    next_id: u64,
    listeners: HashMap<u64, Listener>,
}

/// Registry of change listeners keyed by subscription id.
#[derive(Clone, Default)]
pub struct ChangeHub {
    inner: Arc<Mutex<HubInner>>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for `owner_id` and returns its subscription.
    pub fn subscribe(&self, owner_id: &str) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.next_id += 1;
        let id = inner.next_id;
        inner.listeners.insert(
            id,
            Listener {
                owner_id: owner_id.to_string(),
                tx,
            },
        );
        debug!(subscription = id, owner_id, "change listener registered");

        Subscription {
            guard: SubscriptionGuard {
                id,
                hub: Arc::downgrade(&self.inner),
                active: true,
            },
            receiver: rx,
        }
    }

    /// Sends a notice to every listener registered for `owner_id`.
    ///
    /// Listeners whose receiver has gone away are dropped. Returns the number
    /// of listeners notified.
    pub fn notify(&self, owner_id: &str, kind: ChangeKind) -> usize {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let mut delivered = 0;
        inner.listeners.retain(|_, listener| {
            if listener.owner_id != owner_id {
                return true;
            }
            let notice = ChangeNotice {
                owner_id: owner_id.to_string(),
                kind,
            };
            match listener.tx.send(notice) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => false,
            }
        });
        delivered
    }

    /// Drops every listener, ending their notice streams.
    pub fn close(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let closed = inner.listeners.len();
        inner.listeners.clear();
        debug!(closed, "change hub closed");
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .len()
    }
}

/// A registered listener: the notice receiver plus its unsubscribe guard.
pub struct Subscription {
    guard: SubscriptionGuard,
    receiver: UnboundedReceiver<ChangeNotice>,
}

impl Subscription {
    /// Separates the guard from the receiver so the receiver can be moved
    /// into a task while the owner keeps the ability to unsubscribe.
    pub fn into_parts(self) -> (SubscriptionGuard, UnboundedReceiver<ChangeNotice>) {
        (self.guard, self.receiver)
    }
}

/// Removes its listener from the hub on `unsubscribe()` or drop.
pub struct SubscriptionGuard {
    id: u64,
    hub: Weak<Mutex<HubInner>>,
    active: bool,
}

impl SubscriptionGuard {
    /// Synchronously removes the listener. Idempotent.
    pub fn unsubscribe(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(hub) = self.hub.upgrade() {
            hub.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .listeners
                .remove(&self.id);
            debug!(subscription = self.id, "change listener removed");
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
