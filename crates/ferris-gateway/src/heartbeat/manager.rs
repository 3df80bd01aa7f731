//! Heartbeat manager
//!
//! Runs on its own OS thread so a stalled callback on the runtime cannot
//! delay the timeout check. Every interval it either declares the peer dead
//! (nothing received for longer than the timeout) or enqueues a ping.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tokio::sync::Notify;

use super::Liveness;
use crate::connection::GatewayWriter;
use crate::protocol::{CloseCode, GatewayFrame};

/// Timing of the heartbeat loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for HeartbeatSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(45),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Handle to a running heartbeat thread
#[derive(Debug)]
pub struct HeartbeatManager {
    stop_tx: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl HeartbeatManager {
    /// Start the heartbeat thread
    ///
    /// On timeout the thread enqueues a `HeartbeatTimeout` close on `writer`,
    /// notifies `timed_out` and exits.
    pub fn start(
        settings: HeartbeatSettings,
        liveness: Arc<Liveness>,
        writer: GatewayWriter,
        timed_out: Arc<Notify>,
    ) -> std::io::Result<Self> {
        let (stop_tx, stop_rx) = mpsc::channel();

        let handle = std::thread::Builder::new()
            .name("ferris-heartbeat".to_string())
            .spawn(move || run(settings, &liveness, &writer, &timed_out, &stop_rx))?;

        tracing::debug!(
            interval_ms = settings.interval.as_millis() as u64,
            timeout_ms = settings.timeout.as_millis() as u64,
            "Heartbeat started"
        );

        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Stop the thread and wait for it to exit
    ///
    /// Idempotent. The thread never blocks on the stream, so joining is
    /// bounded by one wake-up.
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Heartbeat thread panicked");
            }
            tracing::debug!("Heartbeat stopped");
        }
    }

    /// Whether the thread is still running
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for HeartbeatManager {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    settings: HeartbeatSettings,
    liveness: &Liveness,
    writer: &GatewayWriter,
    timed_out: &Notify,
    stop_rx: &mpsc::Receiver<()>,
) {
    loop {
        match stop_rx.recv_timeout(settings.interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
        }

        let silence = liveness.silence();
        if silence > settings.timeout {
            tracing::warn!(
                silence_ms = silence.as_millis() as u64,
                timeout_ms = settings.timeout.as_millis() as u64,
                "Heartbeat timed out, closing connection"
            );
            let _ = writer.close(CloseCode::HeartbeatTimeout);
            timed_out.notify_one();
            return;
        }

        if writer.send(GatewayFrame::ping()).is_err() {
            tracing::debug!("Writer gone, heartbeat exiting");
            return;
        }
        liveness.record_ping();
        tracing::trace!("Ping sent");
    }
}
