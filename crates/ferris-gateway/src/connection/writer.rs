//! Single writer for the gateway stream
//!
//! The read loop's handlers and the heartbeat thread both enqueue frames on
//! an unbounded channel; one task owns the sink and drains it, so frames
//! never interleave.

use futures_util::{Sink, SinkExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode as WsCloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{self, Message as WsMessage};

use crate::error::{GatewayError, GatewayResult};
use crate::protocol::{CloseCode, GatewayFrame};

/// Work item for the writer task
#[derive(Debug)]
pub enum Outbound {
    /// Serialize and send a frame
    Frame(GatewayFrame),
    /// Send a close frame and stop
    Close(CloseCode),
}

/// Handle used to enqueue outbound frames
#[derive(Debug, Clone)]
pub struct GatewayWriter {
    tx: mpsc::UnboundedSender<Outbound>,
}

impl GatewayWriter {
    /// Create a writer handle and the queue its task drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Enqueue a frame
    ///
    /// Safe to call from any thread; fails once the writer task has stopped.
    pub fn send(&self, frame: GatewayFrame) -> GatewayResult<()> {
        self.tx.send(Outbound::Frame(frame)).map_err(|_| stopped())
    }

    /// Enqueue a close frame; frames queued after it are discarded
    pub fn close(&self, code: CloseCode) -> GatewayResult<()> {
        self.tx.send(Outbound::Close(code)).map_err(|_| stopped())
    }

    /// Whether the writer task is gone
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

fn stopped() -> GatewayError {
    GatewayError::Closed {
        code: None,
        reason: "writer stopped".to_string(),
    }
}

/// Drain the queue into the sink
///
/// Returns the close code that was sent, or `None` when every handle was
/// dropped without one.
pub async fn run_writer<S>(
    mut sink: S,
    mut rx: mpsc::UnboundedReceiver<Outbound>,
) -> GatewayResult<Option<CloseCode>>
where
    S: Sink<WsMessage, Error = tungstenite::Error> + Unpin,
{
    while let Some(outbound) = rx.recv().await {
        match outbound {
            Outbound::Frame(frame) => {
                let text = frame.to_json()?;
                tracing::trace!(event = frame.name(), "Sending frame");
                sink.send(WsMessage::Text(text))
                    .await
                    .map_err(GatewayError::Transport)?;
            }
            Outbound::Close(code) => {
                tracing::debug!(code = code.as_u16(), "Sending close frame");
                let frame = CloseFrame {
                    code: WsCloseCode::from(code.as_u16()),
                    reason: code.description().into(),
                };
                // The peer may already be gone; the close is best effort
                let _ = sink.send(WsMessage::Close(Some(frame))).await;
                let _ = sink.close().await;
                return Ok(Some(code));
            }
        }
    }

    let _ = sink.close().await;
    Ok(None)
}
