//! Gateway session
//!
//! One session is one stream: connect, identify, start the heartbeat, then
//! read frames until the stream dies or the client closes. A fresh session
//! (and fresh liveness state) is built for every reconnect.

use std::sync::Arc;
use std::time::Duration;

use ferris_common::{ClientConfig, Token};
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async_tls_with_config, Connector, MaybeTlsStream, WebSocketStream};

use super::state::ConnectionState;
use super::writer::{run_writer, GatewayWriter};
use crate::error::{GatewayError, GatewayResult};
use crate::handlers::{EventRouter, SessionContext};
use crate::heartbeat::{HeartbeatManager, HeartbeatSettings, Liveness};
use crate::protocol::{CloseCode, GatewayFrame, IdentifyPayload};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long a closing session waits for its close frame to flush
const CLOSE_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Session parameters taken from the client configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub heartbeat: HeartbeatSettings,
    pub intents: u64,
    pub verify_tls: bool,
}

impl SessionSettings {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            heartbeat: HeartbeatSettings {
                interval: config.gateway.heartbeat_interval,
                timeout: config.gateway.max_heartbeat_timeout,
            },
            intents: config.gateway.intents,
            verify_tls: config.http.verify_tls,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            heartbeat: HeartbeatSettings::default(),
            intents: 0,
            verify_tls: true,
        }
    }
}

/// A single gateway connection
pub struct GatewaySession {
    url: String,
    token: Token,
    settings: SessionSettings,
    router: Arc<EventRouter>,
}

impl GatewaySession {
    pub fn new(
        url: impl Into<String>,
        token: Token,
        settings: SessionSettings,
        router: Arc<EventRouter>,
    ) -> Self {
        Self {
            url: url.into(),
            token,
            settings,
            router,
        }
    }

    /// Run the session to completion
    ///
    /// Returns `Ok(())` only when the client was closed; every other ending
    /// is an error for the control loop to act on.
    pub async fn run(self) -> GatewayResult<()> {
        let status = self.router.status().clone();
        let mut status_rx = status.subscribe();

        if status.is_closed() {
            return Ok(());
        }
        status.transition(ConnectionState::Connecting);

        let stream = tokio::select! {
            stream = self.connect() => stream?,
            () = status.wait_closed() => return Ok(()),
        };
        tracing::info!("Gateway connected");

        let (sink, mut stream) = stream.split();
        let (writer, outbound) = GatewayWriter::channel();
        let mut writer_task: JoinHandle<GatewayResult<Option<CloseCode>>> =
            tokio::spawn(run_writer(sink, outbound));
        let mut writer_running = true;

        status.transition(ConnectionState::Identifying);
        let identify = IdentifyPayload::new(&self.token, self.settings.intents);
        writer.send(GatewayFrame::identify(&identify)?)?;
        tracing::debug!(intents = self.settings.intents, "Identify sent");

        let liveness = Arc::new(Liveness::new());
        let timed_out = Arc::new(Notify::new());
        let mut heartbeat = HeartbeatManager::start(
            self.settings.heartbeat,
            Arc::clone(&liveness),
            writer.clone(),
            Arc::clone(&timed_out),
        )
        .map_err(|e| GatewayError::Closed {
            code: None,
            reason: format!("failed to start heartbeat thread: {e}"),
        })?;

        let ctx = SessionContext {
            writer: writer.clone(),
            liveness: Arc::clone(&liveness),
        };

        let result: GatewayResult<()> = loop {
            tokio::select! {
                biased;

                changed = status_rx.changed() => {
                    if changed.is_err() || status_rx.borrow_and_update().is_closed() {
                        break Ok(());
                    }
                }
                () = timed_out.notified() => break Err(GatewayError::HeartbeatTimeout),
                message = stream.next() => match message {
                    Some(Ok(WsMessage::Text(text))) => {
                        liveness.touch();
                        self.route(&text, &ctx);
                    }
                    Some(Ok(WsMessage::Binary(bytes))) => {
                        liveness.touch();
                        match std::str::from_utf8(&bytes) {
                            Ok(text) => self.route(text, &ctx),
                            Err(_) => tracing::warn!(len = bytes.len(), "Dropping non-UTF-8 binary frame"),
                        }
                    }
                    Some(Ok(WsMessage::Close(frame))) => {
                        let (code, reason) = frame
                            .map(|f| (Some(u16::from(f.code)), f.reason.into_owned()))
                            .unwrap_or((None, String::new()));
                        break Err(GatewayError::Closed { code, reason });
                    }
                    Some(Ok(_)) => liveness.touch(),
                    Some(Err(e)) => break Err(GatewayError::Transport(e)),
                    None => {
                        break Err(GatewayError::Closed {
                            code: None,
                            reason: "stream ended".to_string(),
                        })
                    }
                },
                joined = &mut writer_task, if writer_running => {
                    writer_running = false;
                    break match joined {
                        Ok(Ok(Some(CloseCode::HeartbeatTimeout))) => Err(GatewayError::HeartbeatTimeout),
                        Ok(Ok(_)) => Err(GatewayError::Closed {
                            code: None,
                            reason: "writer stopped".to_string(),
                        }),
                        Ok(Err(e)) => Err(e),
                        Err(e) => Err(GatewayError::Closed {
                            code: None,
                            reason: format!("writer task failed: {e}"),
                        }),
                    };
                }
            }
        };

        heartbeat.stop();
        self.router.end_session();

        let close_code = match &result {
            Ok(()) => CloseCode::Normal,
            Err(GatewayError::HeartbeatTimeout) => CloseCode::HeartbeatTimeout,
            Err(_) => CloseCode::GoingAway,
        };
        let _ = writer.close(close_code);
        drop(ctx);
        drop(writer);

        if writer_running
            && tokio::time::timeout(CLOSE_FLUSH_TIMEOUT, &mut writer_task)
                .await
                .is_err()
        {
            tracing::debug!("Close frame did not flush in time");
            writer_task.abort();
        }

        match &result {
            Ok(()) => tracing::info!("Gateway session closed"),
            Err(e) => tracing::warn!(error = %e, "Gateway session ended"),
        }
        result
    }

    async fn connect(&self) -> GatewayResult<WsStream> {
        let tls = native_tls::TlsConnector::builder()
            .danger_accept_invalid_certs(!self.settings.verify_tls)
            .danger_accept_invalid_hostnames(!self.settings.verify_tls)
            .build()?;

        tracing::debug!(url = %self.url, "Connecting to gateway");
        let (stream, response) = connect_async_tls_with_config(
            self.url.as_str(),
            None,
            false,
            Some(Connector::NativeTls(tls)),
        )
        .await
        .map_err(GatewayError::Connect)?;

        tracing::debug!(status = response.status().as_u16(), "Gateway handshake complete");
        Ok(stream)
    }

    fn route(&self, text: &str, ctx: &SessionContext) {
        let frame = match GatewayFrame::from_json(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping undecodable frame");
                return;
            }
        };

        let name = frame.name().to_string();
        if let Err(e) = self.router.handle(frame, ctx) {
            tracing::warn!(event = %name, error = %e, "Failed to handle frame");
        }
    }
}

impl std::fmt::Debug for GatewaySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewaySession")
            .field("url", &self.url)
            .field("token", &self.token)
            .field("settings", &self.settings)
            .finish()
    }
}
