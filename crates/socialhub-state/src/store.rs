//! Observable state container.
//!
//! A [`Store`] holds one value of `S`. Updates go through
//! [`Store::set_state`]; every subscriber is called afterwards with the
//! previous and the current value. Listeners run without any store lock
//! held, so a listener may read or update the store again.
//!
//! An update made while listeners are running is applied at once but its
//! notification is queued behind the one in progress. Every listener sees
//! the `(previous, current)` pairs in the order the updates were applied.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

/// Callback receiving `(previous, current)` after each update.
pub type Listener<S> = Arc<dyn Fn(&S, &S) + Send + Sync>;

/// Notifications waiting for delivery.
struct Pending<S> {
    queue: VecDeque<(S, S)>,
    notifying: bool,
}

/// Observable state container.
pub struct Store<S> {
    state: RwLock<S>,
    listeners: Mutex<Vec<(u64, Listener<S>)>>,
    pending: Mutex<Pending<S>>,
    next_id: AtomicU64,
}

impl<S: std::fmt::Debug> std::fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.listeners.lock().map(|l| l.len()).unwrap_or_default();
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("listeners", &listeners)
            .finish()
    }
}

impl<S: Clone + Send + Sync + 'static> Store<S> {
    /// Create a store holding `initial`.
    pub fn new(initial: S) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(initial),
            listeners: Mutex::new(Vec::new()),
            pending: Mutex::new(Pending {
                queue: VecDeque::new(),
                notifying: false,
            }),
            next_id: AtomicU64::new(0),
        })
    }

    /// Snapshot of the current state.
    pub fn get_state(&self) -> S {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Read part of the state without cloning all of it.
    pub fn select<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.state.read().unwrap_or_else(|e| e.into_inner()))
    }

    /// Apply `update` and notify subscribers.
    ///
    /// The state changes before this returns. If another update is already
    /// notifying, this one's notification is delivered by that caller once
    /// the current round is done.
    pub fn set_state(&self, update: impl FnOnce(&mut S)) {
        {
            // Held across the write so queue order matches update order.
            let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            let change = {
                let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
                let previous = state.clone();
                update(&mut state);
                (previous, state.clone())
            };
            pending.queue.push_back(change);
            if pending.notifying {
                return;
            }
            pending.notifying = true;
        }

        loop {
            let (previous, current) = {
                let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
                match pending.queue.pop_front() {
                    Some(change) => change,
                    None => {
                        pending.notifying = false;
                        return;
                    }
                }
            };

            let listeners: Vec<Listener<S>> = self
                .listeners
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .iter()
                .map(|(_, listener)| listener.clone())
                .collect();

            for listener in listeners {
                listener(&previous, &current);
            }
        }
    }

    /// Register a listener. It stays registered until the returned
    /// [`Subscription`] is dropped.
    pub fn subscribe(self: &Arc<Self>, listener: Listener<S>) -> Subscription<S> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, listener));
        Subscription {
            store: Arc::downgrade(self),
            id,
        }
    }

    fn unsubscribe(&self, id: u64) {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|(listener_id, _)| *listener_id != id);
    }
}

/// Handle that unsubscribes its listener when dropped.
#[must_use = "dropping a subscription unsubscribes the listener"]
pub struct Subscription<S: Clone + Send + Sync + 'static> {
    store: Weak<Store<S>>,
    id: u64,
}

impl<S: Clone + Send + Sync + 'static> std::fmt::Debug for Subscription<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl<S: Clone + Send + Sync + 'static> Drop for Subscription<S> {
    fn drop(&mut self) {
        if let Some(store) = self.store.upgrade() {
            store.unsubscribe(self.id);
        }
    }
}
