//! Per-session liveness bookkeeping
//!
//! Shared by the read loop (every received frame), the router (pongs) and the
//! heartbeat thread (pings and the timeout check).

use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Round trips slower than this are logged
pub const HIGH_LATENCY: Duration = Duration::from_secs(10);

#[derive(Debug)]
struct Timestamps {
    last_received: Instant,
    last_ping: Option<Instant>,
}

/// Liveness timestamps of one gateway session
#[derive(Debug)]
pub struct Liveness {
    inner: Mutex<Timestamps>,
}

impl Liveness {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Timestamps {
                last_received: Instant::now(),
                last_ping: None,
            }),
        }
    }

    /// Record that a frame arrived
    pub fn touch(&self) {
        self.inner.lock().last_received = Instant::now();
    }

    /// Time since the last frame arrived
    pub fn silence(&self) -> Duration {
        self.inner.lock().last_received.elapsed()
    }

    /// Record that a ping was sent
    pub fn record_ping(&self) {
        self.inner.lock().last_ping = Some(Instant::now());
    }

    /// Record a pong and return the round trip of the matching ping
    ///
    /// `None` when no ping is outstanding.
    pub fn record_pong(&self) -> Option<Duration> {
        let sent = self.inner.lock().last_ping.take()?;
        let latency = sent.elapsed();
        if latency > HIGH_LATENCY {
            tracing::warn!(latency_ms = latency.as_millis() as u64, "High gateway latency");
        }
        Some(latency)
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}
