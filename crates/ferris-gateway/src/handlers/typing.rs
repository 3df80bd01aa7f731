//! Typing indicators
//!
//! `TypingStart` arms an auto-stop timer per `(channel, user)`. A matching
//! `TypingEnd` cancels it; otherwise a synthesized `typing_end` is
//! dispatched once the timer fires.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ferris_core::Snowflake;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use super::{EventRouter, HandlerResult};
use crate::dispatch::Dispatcher;
use crate::events::{Event, Typing};
use crate::protocol::TypingPayload;

type TypingKey = (Snowflake, Snowflake);

struct Timer {
    generation: u64,
    task: JoinHandle<()>,
}

/// Pending auto-stop timers
pub struct TypingTimers {
    timeout: Duration,
    next_generation: AtomicU64,
    timers: Arc<Mutex<HashMap<TypingKey, Timer>>>,
}

impl TypingTimers {
    /// A zero timeout disables auto-stop
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            next_generation: AtomicU64::new(0),
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Arm (or re-arm) the timer for a typing user
    pub fn arm(&self, typing: Typing, dispatcher: &Dispatcher) {
        if self.timeout.is_zero() {
            return;
        }

        let key = (typing.channel_id, typing.user_id);
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let timeout = self.timeout;
        let timers = Arc::clone(&self.timers);
        let dispatcher = dispatcher.clone();

        let mut guard = self.timers.lock();
        let task = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;

            let expired = {
                let mut timers = timers.lock();
                match timers.get(&key) {
                    Some(timer) if timer.generation == generation => {
                        timers.remove(&key);
                        true
                    }
                    _ => false,
                }
            };

            if expired {
                tracing::debug!(
                    channel_id = %typing.channel_id,
                    user_id = %typing.user_id,
                    "Typing timed out"
                );
                dispatcher.dispatch(Event::TypingEnd(typing));
            }
        });

        if let Some(previous) = guard.insert(key, Timer { generation, task }) {
            previous.task.abort();
        }
    }

    /// Cancel the timer for a typing user; returns whether one was pending
    pub fn cancel(&self, typing: &Typing) -> bool {
        match self.timers.lock().remove(&(typing.channel_id, typing.user_id)) {
            Some(timer) => {
                timer.task.abort();
                true
            }
            None => false,
        }
    }

    /// Cancel every pending timer
    pub fn cancel_all(&self) {
        let drained: Vec<Timer> = self.timers.lock().drain().map(|(_, t)| t).collect();
        if !drained.is_empty() {
            tracing::debug!(count = drained.len(), "Cancelled typing timers");
        }
        for timer in drained {
            timer.task.abort();
        }
    }

    /// Number of pending timers
    pub fn len(&self) -> usize {
        self.timers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for TypingTimers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Handles `TypingStart` / `TypingEnd`
pub struct TypingHandler;

impl TypingHandler {
    pub fn start(router: &EventRouter, payload: TypingPayload) -> HandlerResult<()> {
        router.typing().arm(payload, router.dispatcher());
        router.dispatcher().dispatch(Event::TypingStart(payload));
        Ok(())
    }

    pub fn end(router: &EventRouter, payload: TypingPayload) -> HandlerResult<()> {
        router.typing().cancel(&payload);
        router.dispatcher().dispatch(Event::TypingEnd(payload));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn typing(user: u64) -> Typing {
        TypingPayload {
            channel_id: Snowflake::new(1),
            user_id: Snowflake::new(u128::from(user)),
        }
    }

    fn recording_dispatcher() -> (Dispatcher, mpsc::UnboundedReceiver<Typing>) {
        let dispatcher = Dispatcher::new();
        let (tx, rx) = mpsc::unbounded_channel();
        dispatcher.registry().register("typing_end", move |event| {
            let tx = tx.clone();
            async move {
                if let Event::TypingEnd(typing) = event {
                    let _ = tx.send(typing);
                }
                Ok(())
            }
        });
        (dispatcher, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_synthesizes_typing_end() {
        let (dispatcher, mut rx) = recording_dispatcher();
        let timers = TypingTimers::new(Duration::from_secs(10));

        timers.arm(typing(7), &dispatcher);
        assert_eq!(timers.len(), 1);

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(rx.recv().await, Some(typing(7)));
        assert!(timers.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_suppresses_synthesized_end() {
        let (dispatcher, mut rx) = recording_dispatcher();
        let timers = TypingTimers::new(Duration::from_secs(10));

        timers.arm(typing(7), &dispatcher);
        assert!(timers.cancel(&typing(7)));
        assert!(!timers.cancel(&typing(7)));

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_restarts_the_timer() {
        let (dispatcher, mut rx) = recording_dispatcher();
        let timers = TypingTimers::new(Duration::from_secs(10));

        timers.arm(typing(7), &dispatcher);
        tokio::time::sleep(Duration::from_secs(6)).await;
        timers.arm(typing(7), &dispatcher);
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(timers.len(), 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(rx.recv().await, Some(typing(7)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all() {
        let (dispatcher, mut rx) = recording_dispatcher();
        let timers = TypingTimers::new(Duration::from_secs(10));

        timers.arm(typing(1), &dispatcher);
        timers.arm(typing(2), &dispatcher);
        timers.cancel_all();
        assert!(timers.is_empty());

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_zero_timeout_disables_auto_stop() {
        let (dispatcher, _rx) = recording_dispatcher();
        let timers = TypingTimers::new(Duration::ZERO);
        timers.arm(typing(1), &dispatcher);
        assert!(timers.is_empty());
    }
}
