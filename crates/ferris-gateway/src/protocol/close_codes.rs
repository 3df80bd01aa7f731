//! WebSocket close codes
//!
//! Codes the client sends when it closes the gateway connection, plus the
//! server codes it knows how to interpret.

use serde::{Deserialize, Serialize};

/// Gateway WebSocket close codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum CloseCode {
    /// Normal closure, sent when the client is closed explicitly
    Normal = 1000,
    /// Endpoint is going away
    GoingAway = 1001,
    /// Unknown error occurred
    UnknownError = 4000,
    /// Invalid payload encoding (JSON decode error)
    DecodeError = 4002,
    /// Invalid token provided
    AuthenticationFailed = 4004,
    /// Peer stopped answering within the heartbeat timeout
    HeartbeatTimeout = 4009,
}

impl CloseCode {
    /// Create a `CloseCode` from a raw u16 value
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1000 => Some(Self::Normal),
            1001 => Some(Self::GoingAway),
            4000 => Some(Self::UnknownError),
            4002 => Some(Self::DecodeError),
            4004 => Some(Self::AuthenticationFailed),
            4009 => Some(Self::HeartbeatTimeout),
            _ => None,
        }
    }

    /// Get the raw u16 value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Check if the client should reconnect after the server closed with this code
    ///
    /// Only a rejected token is terminal; retrying it can never succeed.
    #[must_use]
    pub const fn should_reconnect(self) -> bool {
        !matches!(self, Self::AuthenticationFailed)
    }

    /// Get the description for this close code
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Normal => "Client closed",
            Self::GoingAway => "Going away",
            Self::UnknownError => "Unknown error occurred",
            Self::DecodeError => "Invalid payload encoding",
            Self::AuthenticationFailed => "Authentication failed",
            Self::HeartbeatTimeout => "Heartbeat timeout",
        }
    }

    /// Get the name of this close code
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::GoingAway => "GoingAway",
            Self::UnknownError => "UnknownError",
            Self::DecodeError => "DecodeError",
            Self::AuthenticationFailed => "AuthenticationFailed",
            Self::HeartbeatTimeout => "HeartbeatTimeout",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.as_u16(), self.description())
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}
