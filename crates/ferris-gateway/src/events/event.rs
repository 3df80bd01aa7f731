//! Normalized events handed to user code
//!
//! Every inbound routine produces exactly one [`EventKind`], and every kind
//! has a single canonical lowercase name used for callback registration.

use std::fmt;

use ferris_core::{Channel, Guild, Invite, Member, Message, Role, User};

use crate::protocol::TypingPayload;

/// A user is typing in a channel
pub type Typing = TypingPayload;

/// A callback failed while handling an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackError {
    /// Canonical name of the event whose callback failed
    pub event: &'static str,
    pub message: String,
}

impl fmt::Display for CallbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "callback for '{}' failed: {}", self.event, self.message)
    }
}

impl std::error::Error for CallbackError {}

/// Event dispatched to handlers and callbacks
#[derive(Debug, Clone)]
pub enum Event {
    IdentifyAccepted(User),
    /// The session is ready; the cache holds the accepted user's guilds
    Ready,
    Message(Message),
    MessageEdit { old: Message, new: Message },
    /// Best-effort copy of the deleted message when it was not cached
    MessageDelete(Message),
    ChannelCreate(Channel),
    ChannelUpdate { old: Channel, new: Channel },
    ChannelDelete(Channel),
    MemberCreate(Member),
    MemberUpdate { old: Member, new: Member },
    MemberDelete(Member),
    GuildCreate(Guild),
    GuildUpdate { old: Guild, new: Guild },
    GuildDelete(Guild),
    InviteCreate(Invite),
    InviteDelete(Invite),
    RoleCreate(Role),
    RoleUpdate { old: Role, new: Role },
    RoleDelete(Role),
    TypingStart(Typing),
    TypingEnd(Typing),
    MemberRoleAdd { member: Member, role: Role },
    MemberRoleRemove { member: Member, role: Role },
    UserCreate(User),
    Error(CallbackError),
}

impl Event {
    /// Kind of this event
    pub fn kind(&self) -> EventKind {
        match self {
            Self::IdentifyAccepted(_) => EventKind::IdentifyAccepted,
            Self::Ready => EventKind::Ready,
            Self::Message(_) => EventKind::Message,
            Self::MessageEdit { .. } => EventKind::MessageEdit,
            Self::MessageDelete(_) => EventKind::MessageDelete,
            Self::ChannelCreate(_) => EventKind::ChannelCreate,
            Self::ChannelUpdate { .. } => EventKind::ChannelUpdate,
            Self::ChannelDelete(_) => EventKind::ChannelDelete,
            Self::MemberCreate(_) => EventKind::MemberCreate,
            Self::MemberUpdate { .. } => EventKind::MemberUpdate,
            Self::MemberDelete(_) => EventKind::MemberDelete,
            Self::GuildCreate(_) => EventKind::GuildCreate,
            Self::GuildUpdate { .. } => EventKind::GuildUpdate,
            Self::GuildDelete(_) => EventKind::GuildDelete,
            Self::InviteCreate(_) => EventKind::InviteCreate,
            Self::InviteDelete(_) => EventKind::InviteDelete,
            Self::RoleCreate(_) => EventKind::RoleCreate,
            Self::RoleUpdate { .. } => EventKind::RoleUpdate,
            Self::RoleDelete(_) => EventKind::RoleDelete,
            Self::TypingStart(_) => EventKind::TypingStart,
            Self::TypingEnd(_) => EventKind::TypingEnd,
            Self::MemberRoleAdd { .. } => EventKind::MemberRoleAdd,
            Self::MemberRoleRemove { .. } => EventKind::MemberRoleRemove,
            Self::UserCreate(_) => EventKind::UserCreate,
            Self::Error(_) => EventKind::Error,
        }
    }

    /// Canonical name of this event
    #[inline]
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// Kinds of [`Event`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    IdentifyAccepted,
    Ready,
    Message,
    MessageEdit,
    MessageDelete,
    ChannelCreate,
    ChannelUpdate,
    ChannelDelete,
    MemberCreate,
    MemberUpdate,
    MemberDelete,
    GuildCreate,
    GuildUpdate,
    GuildDelete,
    InviteCreate,
    InviteDelete,
    RoleCreate,
    RoleUpdate,
    RoleDelete,
    TypingStart,
    TypingEnd,
    MemberRoleAdd,
    MemberRoleRemove,
    UserCreate,
    Error,
}

impl EventKind {
    /// Every kind, in declaration order
    pub const ALL: [EventKind; 25] = [
        Self::IdentifyAccepted,
        Self::Ready,
        Self::Message,
        Self::MessageEdit,
        Self::MessageDelete,
        Self::ChannelCreate,
        Self::ChannelUpdate,
        Self::ChannelDelete,
        Self::MemberCreate,
        Self::MemberUpdate,
        Self::MemberDelete,
        Self::GuildCreate,
        Self::GuildUpdate,
        Self::GuildDelete,
        Self::InviteCreate,
        Self::InviteDelete,
        Self::RoleCreate,
        Self::RoleUpdate,
        Self::RoleDelete,
        Self::TypingStart,
        Self::TypingEnd,
        Self::MemberRoleAdd,
        Self::MemberRoleRemove,
        Self::UserCreate,
        Self::Error,
    ];

    /// Canonical callback name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::IdentifyAccepted => "identify_accepted",
            Self::Ready => "ready",
            Self::Message => "message",
            Self::MessageEdit => "message_edit",
            Self::MessageDelete => "message_delete",
            Self::ChannelCreate => "channel_create",
            Self::ChannelUpdate => "channel_update",
            Self::ChannelDelete => "channel_delete",
            Self::MemberCreate => "member_create",
            Self::MemberUpdate => "member_update",
            Self::MemberDelete => "member_delete",
            Self::GuildCreate => "guild_create",
            Self::GuildUpdate => "guild_update",
            Self::GuildDelete => "guild_delete",
            Self::InviteCreate => "invite_create",
            Self::InviteDelete => "invite_delete",
            Self::RoleCreate => "role_create",
            Self::RoleUpdate => "role_update",
            Self::RoleDelete => "role_delete",
            Self::TypingStart => "typing_start",
            Self::TypingEnd => "typing_end",
            Self::MemberRoleAdd => "member_role_add",
            Self::MemberRoleRemove => "member_role_remove",
            Self::UserCreate => "user_create",
            Self::Error => "error",
        }
    }

    /// Look up a kind by name, accepting the `on_` prefixed form
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = normalize_name(name);
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Canonical form of a callback name: trimmed, lowercase, without `on_`
pub fn normalize_name(name: &str) -> String {
    let name = name.trim().to_ascii_lowercase();
    match name.strip_prefix("on_") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}
