//! HTTP error types
//!
//! Terminal request failures are distinct variants so callers can match on
//! them. Rate limiting never surfaces here; it is retried internally.

use std::fmt;

use serde::Deserialize;

/// Position in the request body that the server rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ErrorLocation {
    pub line: u32,
    pub character: u32,
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} character {}", self.line, self.character)
    }
}

/// REST layer errors
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Bad request: {reason}{}", .location.as_ref().map(|l| format!(" ({l})")).unwrap_or_default())]
    BadRequest {
        reason: String,
        location: Option<ErrorLocation>,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// 503 after the attempt budget was spent
    #[error("Service unavailable: {reason}")]
    ServiceUnavailable { reason: String },

    /// Any other 5xx after the attempt budget was spent
    #[error("Server error {status}: {reason}")]
    ServerError { status: u16, reason: String },

    /// Any status without a dedicated variant
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl HttpError {
    /// HTTP status that produced this error, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest { .. } => Some(400),
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::ServiceUnavailable { .. } => Some(503),
            Self::ServerError { status, .. } | Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Decode(_) | Self::InvalidUrl(_) => None,
        }
    }

    /// Whether repeating the same request later could succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ServiceUnavailable { .. } | Self::ServerError { .. } => true,
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Build the 400 error from a response body
    pub(crate) fn bad_request(body: &str) -> Self {
        #[derive(Deserialize)]
        struct Payload {
            #[serde(default)]
            reason: Option<String>,
            #[serde(default)]
            location: Option<ErrorLocation>,
        }

        match serde_json::from_str::<Payload>(body) {
            Ok(payload) => Self::BadRequest {
                reason: payload.reason.unwrap_or_else(|| body.to_string()),
                location: payload.location,
            },
            Err(_) => Self::BadRequest {
                reason: body.to_string(),
                location: None,
            },
        }
    }

    /// Build the terminal 5xx error once retries are exhausted
    pub(crate) fn server(status: u16, body: &str) -> Self {
        let reason = reason_or_body(body);
        if status == 503 {
            Self::ServiceUnavailable { reason }
        } else {
            Self::ServerError { status, reason }
        }
    }
}

/// `reason` field of a JSON error body, or the raw body
fn reason_or_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("reason").and_then(|r| r.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

/// Result alias for the REST layer
pub type HttpResult<T> = Result<T, HttpError>;
