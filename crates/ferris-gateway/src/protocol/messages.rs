//! Gateway frame format
//!
//! Every frame on the wire, in both directions, is `{"c": <name>, "d": <data>}`
//! with `d` omitted when the frame carries no data.

use super::IdentifyPayload;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the identify frame
pub const IDENTIFY: &str = "Identify";
/// Name of the ping frame
pub const PING: &str = "Ping";
/// Name of the pong frame
pub const PONG: &str = "Pong";

/// Gateway frame (event envelope)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayFrame {
    /// Event name
    pub c: String,

    /// Event data payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,
}

impl GatewayFrame {
    /// Create a frame with a data payload
    #[must_use]
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self {
            c: name.into(),
            d: Some(data),
        }
    }

    /// Create a frame without data
    #[must_use]
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            c: name.into(),
            d: None,
        }
    }

    /// First frame after connecting
    pub fn identify(payload: &IdentifyPayload) -> Result<Self, serde_json::Error> {
        Ok(Self::new(IDENTIFY, serde_json::to_value(payload)?))
    }

    #[must_use]
    pub fn ping() -> Self {
        Self::bare(PING)
    }

    #[must_use]
    pub fn pong() -> Self {
        Self::bare(PONG)
    }

    /// Event name
    #[inline]
    pub fn name(&self) -> &str {
        &self.c
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Display for GatewayFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.d.is_some() {
            write!(f, "GatewayFrame(c={}, with data)", self.c)
        } else {
            write!(f, "GatewayFrame(c={})", self.c)
        }
    }
}
