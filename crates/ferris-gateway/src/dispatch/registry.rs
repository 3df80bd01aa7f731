//! Handler registry
//!
//! Callbacks are stored under the canonical event name, in registration
//! order. `on_message` and `message` resolve to the same bucket.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::RwLock;

use super::handler::CallbackResult;
use crate::events::{normalize_name, Event, EventKind};

/// Registered callback
pub type Callback = Arc<dyn Fn(Event) -> BoxFuture<'static, CallbackResult> + Send + Sync>;

/// Wrap an async closure as a [`Callback`]
pub fn callback<F, Fut>(f: F) -> Callback
where
    F: Fn(Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CallbackResult> + Send + 'static,
{
    Arc::new(move |event| f(event).boxed())
}

/// Handle returned by registration, used to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener {
    id: ListenerId,
    callback: Callback,
}

/// Callbacks by canonical event name
#[derive(Default)]
pub struct HandlerRegistry {
    next_id: AtomicU64,
    listeners: RwLock<HashMap<String, Vec<Listener>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an async closure for an event name
    pub fn register<F, Fut>(&self, name: &str, f: F) -> ListenerId
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult> + Send + 'static,
    {
        self.register_callback(name, callback(f))
    }

    /// Register a callback for an event name
    ///
    /// Registering the same callback again under an equivalent name returns
    /// the existing id instead of storing a duplicate.
    pub fn register_callback(&self, name: &str, callback: Callback) -> ListenerId {
        let name = normalize_name(name);
        if EventKind::from_name(&name).is_none() {
            tracing::warn!(event = %name, "Registered callback for an unknown event name");
        }

        let mut listeners = self.listeners.write();
        let bucket = listeners.entry(name).or_default();
        if let Some(existing) = bucket.iter().find(|l| Arc::ptr_eq(&l.callback, &callback)) {
            return existing.id;
        }

        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        bucket.push(Listener { id, callback });
        id
    }

    /// Remove one callback; returns whether it was registered
    pub fn unregister(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        for bucket in listeners.values_mut() {
            if let Some(index) = bucket.iter().position(|l| l.id == id) {
                bucket.remove(index);
                return true;
            }
        }
        false
    }

    /// Remove every callback for a name; returns how many were removed
    pub fn clear(&self, name: &str) -> usize {
        self.listeners
            .write()
            .remove(&normalize_name(name))
            .map_or(0, |bucket| bucket.len())
    }

    /// Callbacks for a name, in registration order
    pub fn callbacks(&self, name: &str) -> Vec<Callback> {
        self.listeners
            .read()
            .get(&normalize_name(name))
            .map(|bucket| bucket.iter().map(|l| Arc::clone(&l.callback)).collect())
            .unwrap_or_default()
    }

    /// Number of callbacks for a name
    pub fn count(&self, name: &str) -> usize {
        self.listeners
            .read()
            .get(&normalize_name(name))
            .map_or(0, Vec::len)
    }

    /// Total number of callbacks
    pub fn len(&self) -> usize {
        self.listeners.read().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.listeners.read();
        let mut counts: Vec<(&str, usize)> = listeners
            .iter()
            .map(|(name, bucket)| (name.as_str(), bucket.len()))
            .collect();
        counts.sort_unstable();
        f.debug_struct("HandlerRegistry").field("listeners", &counts).finish()
    }
}
