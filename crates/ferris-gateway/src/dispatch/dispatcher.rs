//! Event dispatcher
//!
//! Fans one event out to the default handler and every registered callback.
//! All invocations for an event are driven by one task, started in
//! registration order; a failure in one never reaches the others or the read
//! loop, and is re-dispatched as an `error` event.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use parking_lot::RwLock;
use tokio::task::JoinHandle;

use super::handler::{invoke, CallbackResult, EventHandler};
use super::registry::HandlerRegistry;
use crate::events::{CallbackError, Event, EventKind};

/// Event dispatcher
///
/// Cheap to clone; clones share the registry and the handler slot.
#[derive(Clone, Default)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

#[derive(Default)]
struct DispatcherInner {
    registry: HandlerRegistry,
    handler: RwLock<Option<Arc<dyn EventHandler>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dispatcher with a default handler
    pub fn with_handler(handler: Arc<dyn EventHandler>) -> Self {
        let dispatcher = Self::new();
        dispatcher.set_handler(handler);
        dispatcher
    }

    /// Install the default handler, replacing any previous one
    pub fn set_handler(&self, handler: Arc<dyn EventHandler>) {
        *self.inner.handler.write() = Some(handler);
    }

    /// Callback registry
    #[inline]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.inner.registry
    }

    /// Fan an event out; returns before any callback completes
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, event: Event) -> DispatchHandle {
        let kind = event.kind();
        let handler = self.inner.handler.read().clone();
        let callbacks = self.inner.registry.callbacks(kind.name());

        tracing::debug!(
            event = kind.name(),
            callbacks = callbacks.len(),
            has_handler = handler.is_some(),
            "Dispatching event"
        );

        let mut invocations: Vec<BoxFuture<'static, ()>> = Vec::with_capacity(callbacks.len() + 1);

        if let Some(handler) = handler {
            let event = event.clone();
            let dispatcher = self.clone();
            invocations.push(
                async move {
                    let outcome = AssertUnwindSafe(invoke(handler.as_ref(), event))
                        .catch_unwind()
                        .await;
                    dispatcher.settle(kind, outcome);
                }
                .boxed(),
            );
        }

        for callback in callbacks {
            let event = event.clone();
            let dispatcher = self.clone();
            invocations.push(
                async move {
                    let outcome = AssertUnwindSafe(async move { callback(event).await })
                        .catch_unwind()
                        .await;
                    dispatcher.settle(kind, outcome);
                }
                .boxed(),
            );
        }

        let invocations_len = invocations.len();
        // join_all polls in push order, so callbacks start in registration order
        let task = (invocations_len > 0).then(|| {
            tokio::spawn(async move {
                join_all(invocations).await;
            })
        });

        DispatchHandle {
            task,
            invocations: invocations_len,
        }
    }

    /// Report a failed invocation as an `error` event
    fn settle(&self, kind: EventKind, outcome: Result<CallbackResult, Box<dyn Any + Send>>) {
        let message = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(error)) => error.to_string(),
            Err(panic) => panic_message(panic.as_ref()),
        };

        if kind == EventKind::Error {
            tracing::error!(error = %message, "Error handler failed; not re-dispatching");
            return;
        }

        tracing::warn!(event = kind.name(), error = %message, "Event callback failed");
        self.dispatch(Event::Error(CallbackError {
            event: kind.name(),
            message,
        }));
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.inner.registry)
            .field("has_handler", &self.inner.handler.read().is_some())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}

/// Fan-out task for one dispatched event
#[derive(Debug)]
pub struct DispatchHandle {
    task: Option<JoinHandle<()>>,
    invocations: usize,
}

impl DispatchHandle {
    /// Number of invocations started
    pub fn len(&self) -> usize {
        self.invocations
    }

    pub fn is_empty(&self) -> bool {
        self.invocations == 0
    }

    /// Wait for every invocation of this event to finish
    ///
    /// Does not wait for an `error` event raised by a failing invocation.
    pub async fn join(self) {
        if let Some(task) = self.task {
            let _ = task.await;
        }
    }

    /// Cancel invocations that have not finished
    pub fn abort(&self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}
