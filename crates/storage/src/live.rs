//! Live-query snapshots for the in-memory content store.
//!
//! The hosted store pushes a full list snapshot to every subscriber whenever
//! a query's result set changes. This module models that with one
//! `tokio::sync::watch` channel per query key: a subscription is an explicit
//! handle over the receiver, the first `recv` yields the list currently in
//! effect, later `recv`s wait for the next change, and dropping the handle
//! unsubscribes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

/// Per-key snapshot channels for one queryable collection.
pub struct LiveTable<K, T> {
    channels: Mutex<HashMap<K, watch::Sender<Vec<T>>>>,
}

impl<K, T> Default for LiveTable<K, T> {
    fn default() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, T> LiveTable<K, T>
where
    K: std::hash::Hash + Eq + Clone,
    T: Clone,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to the list snapshots for `key`, seeding with `current`.
    ///
    /// The returned handle immediately observes `current`; every later
    /// `publish` for the same key delivers a fresh snapshot. Restartable:
    /// subscribing again yields a new, independent sequence.
    pub fn subscribe(&self, key: &K, current: Vec<T>) -> Snapshots<T> {
        let mut channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        let sender = channels.entry(key.clone()).or_insert_with(|| {
            let (tx, _rx) = watch::channel(Vec::new());
            tx
        });
        // Seed so a subscriber never starts behind the store. The value is
        // refreshed without notifying, so existing subscribers of the same
        // key are not woken; only the fresh receiver is marked changed.
        sender.send_if_modified(|value| {
            *value = current;
            false
        });
        let mut rx = sender.subscribe();
        rx.mark_changed();
        Snapshots { rx }
    }

    /// Push a new snapshot to every live subscriber of `key`.
    pub fn publish(&self, key: &K, snapshot: Vec<T>) {
        let channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(sender) = channels.get(key) {
            // send_replace keeps the latest value even with no subscribers
            sender.send_replace(snapshot);
        }
    }
}

/// A live-query subscription handle.
///
/// Lazy and unbounded: each `recv` yields the next list snapshot, starting
/// with the one in effect at subscribe time. Dropping the handle cancels the
/// subscription; no further cleanup is required.
pub struct Snapshots<T> {
    rx: watch::Receiver<Vec<T>>,
}

impl<T: Clone> Snapshots<T> {
    /// Waits for and returns the next snapshot.
    ///
    /// Returns `None` once the backing store has been dropped.
    pub async fn recv(&mut self) -> Option<Vec<T>> {
        if self.rx.changed().await.is_err() {
            return None;
        }
        Some(self.rx.borrow_and_update().clone())
    }

    /// Returns the latest snapshot without waiting.
    #[must_use]
    pub fn latest(&self) -> Vec<T> {
        self.rx.borrow().clone()
    }
}
