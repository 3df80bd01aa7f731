//! Connection state
//!
//! A single watch channel carries the state of the gateway connection. It
//! doubles as the ready signal and as the close signal for running sessions.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Gateway connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Not started yet
    Disconnected,
    /// Resolving the endpoint and opening the stream
    Connecting,
    /// Identify sent, waiting for `IdentifyAccepted`
    Identifying,
    /// `IdentifyAccepted` received
    Ready,
    /// Session ended, a new one is about to start
    Reconnecting,
    /// Closed for good
    Closed,
}

impl ConnectionState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Identifying => "identifying",
            Self::Ready => "ready",
            Self::Reconnecting => "reconnecting",
            Self::Closed => "closed",
        }
    }

    #[inline]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }

    #[inline]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared, observable connection state
///
/// `Closed` is terminal: once set, no other transition is accepted.
#[derive(Debug, Clone)]
pub struct ConnectionStatus {
    tx: Arc<watch::Sender<ConnectionState>>,
}

impl ConnectionStatus {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ConnectionState::Disconnected);
        Self { tx: Arc::new(tx) }
    }

    /// Current state
    pub fn get(&self) -> ConnectionState {
        *self.tx.borrow()
    }

    /// Receiver notified on every transition
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.tx.subscribe()
    }

    /// Move to `next` unless closed; returns whether the state changed
    pub fn transition(&self, next: ConnectionState) -> bool {
        self.tx.send_if_modified(|state| {
            if state.is_closed() || *state == next {
                return false;
            }
            tracing::debug!(from = %state, to = %next, "Connection state changed");
            *state = next;
            true
        })
    }

    /// Enter `Ready`; true only for the transition that resolves waiters
    pub fn mark_ready(&self) -> bool {
        self.transition(ConnectionState::Ready)
    }

    /// Enter `Closed`; true only for the first call
    pub fn close(&self) -> bool {
        self.tx.send_if_modified(|state| {
            if state.is_closed() {
                return false;
            }
            *state = ConnectionState::Closed;
            true
        })
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.get().is_closed()
    }

    /// Wait until the state is `Ready`; false if it became `Closed` instead
    pub async fn wait_ready(&self) -> bool {
        let mut rx = self.tx.subscribe();
        let state = match rx.wait_for(|s| s.is_ready() || s.is_closed()).await {
            Ok(state) => *state,
            Err(_) => ConnectionState::Closed,
        };
        state.is_ready()
    }

    /// Wait until the state is `Closed`
    pub async fn wait_closed(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|s| s.is_closed()).await;
    }
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self::new()
    }
}
