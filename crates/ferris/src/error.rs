//! Client error types

use ferris_common::ConfigError;
use ferris_gateway::GatewayError;
use ferris_http::HttpError;
use thiserror::Error;

/// Errors surfaced by [`Client`](crate::Client)
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Http(#[from] HttpError),

    /// The gateway failed in a way reconnecting cannot fix
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Client is already running")]
    AlreadyRunning,

    #[error("Client is closed")]
    Closed,

    #[error("Client is not ready")]
    NotReady,
}

/// Client result type
pub type ClientResult<T> = Result<T, ClientError>;
