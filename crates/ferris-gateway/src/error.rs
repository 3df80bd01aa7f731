//! Gateway error types

use ferris_http::HttpError;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

use crate::protocol::CloseCode;

/// Why a gateway session ended
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The stream could not be opened
    #[error("Failed to connect to gateway: {0}")]
    Connect(#[source] tungstenite::Error),

    /// TLS connector could not be built
    #[error("TLS setup failed: {0}")]
    Tls(#[from] native_tls::Error),

    /// Read or write failed on an open stream
    #[error("Gateway transport error: {0}")]
    Transport(#[source] tungstenite::Error),

    /// The stream was closed by the peer or ended
    #[error("Gateway closed ({}): {reason}", .code.map_or_else(|| "no code".to_string(), |c| c.to_string()))]
    Closed { code: Option<u16>, reason: String },

    /// No frame arrived within the heartbeat timeout
    #[error("Gateway heartbeat timed out")]
    HeartbeatTimeout,

    /// Endpoint discovery failed
    #[error("Gateway discovery failed: {0}")]
    Http(#[from] HttpError),

    /// An outbound frame could not be serialized
    #[error("Failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),
}

impl GatewayError {
    /// Whether the control loop should open a new session
    ///
    /// Everything is retried except a rejected token, which fails the same
    /// way on every attempt.
    pub fn is_reconnectable(&self) -> bool {
        match self {
            Self::Closed { code: Some(code), .. } => {
                CloseCode::from_u16(*code).map_or(true, CloseCode::should_reconnect)
            }
            Self::Http(HttpError::Unauthorized(_)) => false,
            _ => true,
        }
    }

    /// Whether the stream failed to open, as opposed to dying later
    pub fn is_connect_failure(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::Tls(_))
    }
}

/// Gateway result type
pub type GatewayResult<T> = Result<T, GatewayError>;
