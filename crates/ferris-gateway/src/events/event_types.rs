//! Gateway event types
//!
//! Names carried in the `c` field of inbound frames.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Inbound gateway event names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GatewayEventType {
    // Connection events
    /// Sent after a successful Identify
    IdentifyAccepted,
    /// Liveness check from the peer
    Ping,
    /// Answer to our liveness check
    Pong,

    // Message events
    MessageCreate,
    MessageUpdate,
    MessageDelete,

    // Channel events
    ChannelCreate,
    ChannelUpdate,
    ChannelDelete,

    // Member events
    MemberCreate,
    MemberUpdate,
    MemberDelete,

    // Guild events
    GuildCreate,
    GuildUpdate,
    GuildDelete,

    // Invite events
    InviteCreate,
    InviteDelete,

    // Role events
    RoleCreate,
    RoleUpdate,
    RoleDelete,

    // Typing events
    TypingStart,
    TypingEnd,

    // Member role events
    MemberRoleAdd,
    MemberRoleRemove,

    // User events
    UserCreate,
}

impl GatewayEventType {
    /// Get the string representation of the event type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IdentifyAccepted => "IdentifyAccepted",
            Self::Ping => "Ping",
            Self::Pong => "Pong",
            Self::MessageCreate => "MessageCreate",
            Self::MessageUpdate => "MessageUpdate",
            Self::MessageDelete => "MessageDelete",
            Self::ChannelCreate => "ChannelCreate",
            Self::ChannelUpdate => "ChannelUpdate",
            Self::ChannelDelete => "ChannelDelete",
            Self::MemberCreate => "MemberCreate",
            Self::MemberUpdate => "MemberUpdate",
            Self::MemberDelete => "MemberDelete",
            Self::GuildCreate => "GuildCreate",
            Self::GuildUpdate => "GuildUpdate",
            Self::GuildDelete => "GuildDelete",
            Self::InviteCreate => "InviteCreate",
            Self::InviteDelete => "InviteDelete",
            Self::RoleCreate => "RoleCreate",
            Self::RoleUpdate => "RoleUpdate",
            Self::RoleDelete => "RoleDelete",
            Self::TypingStart => "TypingStart",
            Self::TypingEnd => "TypingEnd",
            Self::MemberRoleAdd => "MemberRoleAdd",
            Self::MemberRoleRemove => "MemberRoleRemove",
            Self::UserCreate => "UserCreate",
        }
    }

    /// Parse an event type from a string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "IdentifyAccepted" => Some(Self::IdentifyAccepted),
            "Ping" => Some(Self::Ping),
            "Pong" => Some(Self::Pong),
            "MessageCreate" => Some(Self::MessageCreate),
            "MessageUpdate" => Some(Self::MessageUpdate),
            "MessageDelete" => Some(Self::MessageDelete),
            "ChannelCreate" => Some(Self::ChannelCreate),
            "ChannelUpdate" => Some(Self::ChannelUpdate),
            "ChannelDelete" => Some(Self::ChannelDelete),
            "MemberCreate" => Some(Self::MemberCreate),
            "MemberUpdate" => Some(Self::MemberUpdate),
            "MemberDelete" => Some(Self::MemberDelete),
            "GuildCreate" => Some(Self::GuildCreate),
            "GuildUpdate" => Some(Self::GuildUpdate),
            "GuildDelete" => Some(Self::GuildDelete),
            "InviteCreate" => Some(Self::InviteCreate),
            "InviteDelete" => Some(Self::InviteDelete),
            "RoleCreate" => Some(Self::RoleCreate),
            "RoleUpdate" => Some(Self::RoleUpdate),
            "RoleDelete" => Some(Self::RoleDelete),
            "TypingStart" => Some(Self::TypingStart),
            "TypingEnd" => Some(Self::TypingEnd),
            "MemberRoleAdd" => Some(Self::MemberRoleAdd),
            "MemberRoleRemove" => Some(Self::MemberRoleRemove),
            "UserCreate" => Some(Self::UserCreate),
            _ => None,
        }
    }
}

impl fmt::Display for GatewayEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<GatewayEventType> for String {
    fn from(event: GatewayEventType) -> Self {
        event.as_str().to_string()
    }
}
