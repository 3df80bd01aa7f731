//! Handler error types

use thiserror::Error;

/// Failure to route one inbound frame
///
/// Never fatal to the connection; the frame is logged and dropped.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The frame has no `d` but the event requires one
    #[error("{event} frame carries no data")]
    MissingData { event: &'static str },

    /// `d` does not match the event's payload shape
    #[error("Invalid {event} payload: {source}")]
    InvalidPayload {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// An outbound reply could not be enqueued
    #[error("Failed to reply: {0}")]
    Reply(#[from] crate::error::GatewayError),
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
