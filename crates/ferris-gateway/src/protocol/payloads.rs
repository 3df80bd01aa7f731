//! Payload definitions
//!
//! The outbound identify payload and the `d` shapes of every inbound event.

use ferris_common::Token;
use ferris_core::{Channel, Guild, Invite, Member, Message, Role, Snowflake, User};
use serde::{Deserialize, Serialize};

/// Payload of the `Identify` frame
#[derive(Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    pub token: String,
    pub intents: u64,
}

impl IdentifyPayload {
    #[must_use]
    pub fn new(token: &Token, intents: u64) -> Self {
        Self {
            token: token.expose().to_string(),
            intents,
        }
    }
}

impl std::fmt::Debug for IdentifyPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentifyPayload")
            .field("token", &Token::new(self.token.clone()))
            .field("intents", &self.intents)
            .finish()
    }
}

/// `IdentifyAccepted`
#[derive(Debug, Clone, Deserialize)]
pub struct IdentifyAcceptedPayload {
    pub user: User,
}

/// Snapshot pair carried by every `*Update` event
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePayload<T> {
    pub old: T,
    pub new: T,
}

/// `MessageCreate`
#[derive(Debug, Clone, Deserialize)]
pub struct MessagePayload {
    pub message: Message,
}

/// `MessageDelete`
///
/// The message may be partial; some servers send only its id, either inside
/// the message object or at the top level.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MessageDeletePayload {
    pub message: Message,
    pub id: Option<Snowflake>,
}

impl MessageDeletePayload {
    /// Id of the deleted message, wherever the server put it
    pub fn message_id(&self) -> Snowflake {
        match self.id {
            Some(id) if self.message.id.is_zero() => id,
            _ => self.message.id,
        }
    }
}

/// `ChannelCreate` / `ChannelDelete`
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelPayload {
    pub channel: Channel,
}

/// `MemberCreate` / `MemberDelete`
#[derive(Debug, Clone, Deserialize)]
pub struct MemberPayload {
    pub member: Member,
}

/// `GuildCreate` / `GuildDelete`
#[derive(Debug, Clone, Deserialize)]
pub struct GuildPayload {
    pub guild: Guild,
}

/// `InviteCreate` / `InviteDelete`
#[derive(Debug, Clone, Deserialize)]
pub struct InvitePayload {
    pub invite: Invite,
}

/// `RoleCreate` / `RoleDelete`
#[derive(Debug, Clone, Deserialize)]
pub struct RolePayload {
    pub role: Role,
}

/// `TypingStart` / `TypingEnd`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypingPayload {
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
}

/// `UserCreate`
///
/// The id may also arrive at the top level when the user object is partial.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserPayload {
    pub user: User,
    pub id: Option<Snowflake>,
}

impl UserPayload {
    /// The user with its id filled in from the top level if missing
    pub fn into_user(self) -> User {
        let mut user = self.user;
        if let Some(id) = self.id.filter(|_| user.id.is_zero()) {
            user.id = id;
        }
        user
    }
}

/// `MemberRoleAdd` / `MemberRoleRemove`
#[derive(Debug, Clone, Deserialize)]
pub struct MemberRolePayload {
    pub member: Member,
    pub role: Role,
}
