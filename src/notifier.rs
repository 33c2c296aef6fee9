//! Priority-ordered error notification
//!
//! The [`Notifier`] maps an identifier to `(priority, callback)` and fans each
//! [`ErrorEvent`] out to every registered callback:
//! - highest priority first
//! - equal priorities run in the order their identifiers were first registered
//! - re-registering an identifier replaces its priority and callback but keeps
//!   its registration slot for tie-breaking
//!
//! `notify` snapshots the callbacks under the registry lock and runs them
//! after releasing it, so a callback may register or unregister observers
//! without deadlocking. Those changes apply to the next dispatch only.

use crate::event::ErrorEvent;
use parking_lot::Mutex;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Observer callback
pub type Callback = Arc<dyn Fn(&ErrorEvent) + Send + Sync>;

/// Dispatch position: descending priority, then registration sequence
type SlotKey = (Reverse<i32>, u64);

#[derive(Default)]
struct Registry {
    /// Callbacks in dispatch order
    slots: BTreeMap<SlotKey, Callback>,
    /// Identifier to its current slot
    index: HashMap<String, SlotKey>,
    /// Next registration sequence
    next_seq: u64,
}

/// Process-wide registry of error observers
#[derive(Default)]
pub struct Notifier {
    registry: Mutex<Registry>,
}

impl Notifier {
    /// Create an isolated notifier
    ///
    /// Most code reports through [`Notifier::shared`]; separate instances are
    /// useful for embedding and tests.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide notifier
    pub fn shared() -> &'static Arc<Notifier> {
        static SHARED: OnceLock<Arc<Notifier>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(Notifier::new()))
    }

    /// Insert or replace the observer registered under `identifier`
    pub fn set_notification<F>(&self, priority: i32, identifier: impl Into<String>, callback: F)
    where
        F: Fn(&ErrorEvent) + Send + Sync + 'static,
    {
        self.set_callback(priority, identifier, Arc::new(callback));
    }

    /// Same as [`set_notification`](Self::set_notification) for an already shared callback
    pub fn set_callback(&self, priority: i32, identifier: impl Into<String>, callback: Callback) {
        let identifier = identifier.into();
        let mut registry = self.registry.lock();

        let seq = match registry.index.get(&identifier).copied() {
            Some(old) => {
                registry.slots.remove(&old);
                old.1
            }
            None => {
                let seq = registry.next_seq;
                registry.next_seq += 1;
                seq
            }
        };

        let key = (Reverse(priority), seq);
        registry.slots.insert(key, callback);
        registry.index.insert(identifier.clone(), key);
        debug!(identifier = %identifier, priority, "registered error observer");
    }

    /// Remove the observer registered under `identifier`; absent identifiers are ignored
    pub fn unset_notification(&self, identifier: &str) {
        let mut registry = self.registry.lock();
        if let Some(key) = registry.index.remove(identifier) {
            registry.slots.remove(&key);
            debug!(identifier = %identifier, "unregistered error observer");
        }
    }

    /// Dispatch `event` to every observer in descending priority
    pub fn notify(&self, event: &ErrorEvent) {
        for callback in self.snapshot() {
            callback(event);
        }
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.registry.lock().index.contains_key(identifier)
    }

    pub fn priority_of(&self, identifier: &str) -> Option<i32> {
        self.registry
            .lock()
            .index
            .get(identifier)
            .map(|(Reverse(priority), _)| *priority)
    }

    pub fn len(&self) -> usize {
        self.registry.lock().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Vec<Callback> {
        self.registry.lock().slots.values().cloned().collect()
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.lock();
        let mut identifiers: Vec<(&String, &SlotKey)> = registry.index.iter().collect();
        identifiers.sort_by_key(|(_, key)| **key);
        f.debug_struct("Notifier")
            .field(
                "observers",
                &identifiers.iter().map(|(id, _)| id).collect::<Vec<_>>(),
            )
            .finish()
    }
}
