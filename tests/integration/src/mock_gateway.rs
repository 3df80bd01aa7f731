//! Scripted gateway server
//!
//! Accepts websocket connections and hands each one to the test, which
//! then reads the client's frames and writes events back.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

use crate::STEP_TIMEOUT;

/// In-process gateway
pub struct MockGateway {
    addr: SocketAddr,
    connections: mpsc::UnboundedReceiver<GatewayConnection>,
    accepted: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl MockGateway {
    /// Bind to an ephemeral port and start accepting
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let (tx, connections) = mpsc::unbounded_channel();
        let accepted = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&accepted);
        let handle = tokio::spawn(async move {
            while let Ok((stream, peer)) = listener.accept().await {
                let tx = tx.clone();
                let counter = Arc::clone(&counter);
                tokio::spawn(async move {
                    match accept_async(stream).await {
                        Ok(ws) => {
                            counter.fetch_add(1, Ordering::SeqCst);
                            let _ = tx.send(GatewayConnection { ws });
                        }
                        Err(e) => tracing::warn!(peer = %peer, error = %e, "Mock gateway handshake failed"),
                    }
                });
            }
        });

        Ok(Self {
            addr,
            connections,
            accepted,
            handle,
        })
    }

    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Next connection the client opens
    pub async fn accept(&mut self) -> Result<GatewayConnection> {
        tokio::time::timeout(STEP_TIMEOUT, self.connections.recv())
            .await
            .context("timed out waiting for the client to connect")?
            .ok_or_else(|| anyhow!("mock gateway stopped accepting"))
    }

    /// Next connection, with the identify already read and accepted
    pub async fn accept_identified(&mut self, user: Value) -> Result<GatewayConnection> {
        let mut conn = self.accept().await?;
        conn.expect_identify().await?;
        conn.send_event("IdentifyAccepted", json!({ "user": user })).await?;
        Ok(conn)
    }

    /// Connections accepted so far
    pub fn connection_count(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }
}

impl Drop for MockGateway {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// One accepted client connection
pub struct GatewayConnection {
    ws: WebSocketStream<TcpStream>,
}

impl GatewayConnection {
    /// Next text frame from the client as JSON; `None` once it closed
    pub async fn recv(&mut self) -> Result<Option<Value>> {
        self.recv_within(STEP_TIMEOUT).await
    }

    /// Like [`GatewayConnection::recv`] with a caller-chosen deadline
    pub async fn recv_within(&mut self, timeout: Duration) -> Result<Option<Value>> {
        tokio::time::timeout(timeout, next_text(&mut self.ws))
            .await
            .context("timed out waiting for a client frame")?
    }

    /// Skip frames until one named `name` arrives; returns the whole frame
    pub async fn recv_named(&mut self, name: &str) -> Result<Value> {
        loop {
            match self.recv().await? {
                Some(frame) if frame["c"] == name => return Ok(frame),
                Some(_) => {}
                None => bail!("connection closed before a {name} frame"),
            }
        }
    }

    /// Read the first frame and check it is an identify; returns its data
    pub async fn expect_identify(&mut self) -> Result<Value> {
        let frame = self
            .recv()
            .await?
            .ok_or_else(|| anyhow!("connection closed before identify"))?;
        if frame["c"] != "Identify" {
            bail!("expected Identify, got {frame}");
        }
        Ok(frame["d"].clone())
    }

    /// Send `{"c": name, "d": data}`
    pub async fn send_event(&mut self, name: &str, data: Value) -> Result<()> {
        self.send_raw(&json!({ "c": name, "d": data }).to_string()).await
    }

    /// Send `{"c": name}`
    pub async fn send_bare(&mut self, name: &str) -> Result<()> {
        self.send_raw(&json!({ "c": name }).to_string()).await
    }

    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        self.ws.send(Message::Text(text.to_string())).await?;
        Ok(())
    }

    /// Close from the server side
    pub async fn close(mut self, code: u16, reason: &str) -> Result<()> {
        self.ws
            .close(Some(CloseFrame {
                code: CloseCode::from(code),
                reason: reason.to_string().into(),
            }))
            .await?;
        // Drain until the client acknowledges
        while let Ok(Some(Ok(_))) = tokio::time::timeout(STEP_TIMEOUT, self.ws.next()).await {}
        Ok(())
    }

    /// Wait for the client to close; returns its close code
    pub async fn closed_by_client(&mut self) -> Result<Option<u16>> {
        tokio::time::timeout(STEP_TIMEOUT, async {
            while let Some(message) = self.ws.next().await {
                if let Ok(Message::Close(frame)) = message {
                    return frame.map(|f| u16::from(f.code));
                }
            }
            None
        })
        .await
        .context("timed out waiting for the client to close")
    }
}

async fn next_text(ws: &mut WebSocketStream<TcpStream>) -> Result<Option<Value>> {
    while let Some(message) = ws.next().await {
        match message? {
            Message::Text(text) => return Ok(Some(serde_json::from_str(&text)?)),
            Message::Close(_) => return Ok(None),
            _ => {}
        }
    }
    Ok(None)
}
