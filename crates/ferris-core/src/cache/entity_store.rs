//! Entity store
//!
//! Owns the canonical copy of every cached entity. Other structures refer to
//! entities by id and resolve them here. Maps use `DashMap` so reads never
//! block the event-processing task; messages live in a bounded FIFO buffer.

use std::collections::VecDeque;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::entities::{Channel, Guild, Invite, Member, Message, Role, User};
use crate::value_objects::Snowflake;

/// Default capacity of the message buffer
pub const DEFAULT_MAX_MESSAGES: usize = 1000;

/// Cache of users, guilds, channels, members, roles, invites and recent messages
pub struct EntityStore {
    users: DashMap<Snowflake, User>,
    guilds: DashMap<Snowflake, Guild>,
    channels: DashMap<Snowflake, Channel>,
    roles: DashMap<Snowflake, Role>,
    /// Keyed by `(guild_id, user_id)`
    members: DashMap<(Snowflake, Snowflake), Member>,
    /// Keyed by invite code
    invites: DashMap<String, Invite>,
    messages: Mutex<VecDeque<Message>>,
    max_messages: usize,
}

impl EntityStore {
    /// Create a store whose message buffer holds at most `max_messages`
    #[must_use]
    pub fn new(max_messages: usize) -> Self {
        Self {
            users: DashMap::new(),
            guilds: DashMap::new(),
            channels: DashMap::new(),
            roles: DashMap::new(),
            members: DashMap::new(),
            invites: DashMap::new(),
            messages: Mutex::new(VecDeque::with_capacity(max_messages.min(DEFAULT_MAX_MESSAGES))),
            max_messages,
        }
    }

    /// Create a new store wrapped in Arc
    #[must_use]
    pub fn new_shared(max_messages: usize) -> Arc<Self> {
        Arc::new(Self::new(max_messages))
    }

    /// Capacity of the message buffer
    #[inline]
    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Insert a user or merge it into the cached copy
    ///
    /// Nested guilds are stored as well.
    pub fn upsert_user(&self, mut user: User) -> User {
        for guild in user.take_guilds() {
            self.upsert_guild(guild);
        }

        let mut entry = self.users.entry(user.id).or_default();
        if entry.id.is_zero() {
            *entry = user;
        } else {
            entry.merge(user);
        }
        entry.clone()
    }

    /// Get a cached user
    pub fn user(&self, id: Snowflake) -> Option<User> {
        self.users.get(&id).map(|u| u.clone())
    }

    /// Remove a cached user
    pub fn remove_user(&self, id: Snowflake) -> Option<User> {
        self.users.remove(&id).map(|(_, u)| u)
    }

    /// Snapshot of all cached users
    pub fn users(&self) -> Vec<User> {
        self.users.iter().map(|u| u.clone()).collect()
    }

    // ========================================================================
    // Guilds
    // ========================================================================

    /// Insert a guild or merge it into the cached copy
    ///
    /// Nested channels and members are stored as well.
    pub fn upsert_guild(&self, mut guild: Guild) -> Guild {
        let (channels, members) = guild.take_nested();
        let guild_id = guild.id;

        let merged = {
            let mut entry = self.guilds.entry(guild_id).or_default();
            if entry.id.is_zero() {
                *entry = guild;
            } else {
                entry.merge(guild);
            }
            entry.clone()
        };

        for channel in channels {
            self.upsert_channel(channel);
        }
        for member in members {
            self.upsert_member(member);
        }

        tracing::trace!(guild_id = %guild_id, "Guild cached");
        self.guild(guild_id).unwrap_or(merged)
    }

    /// Get a cached guild
    pub fn guild(&self, id: Snowflake) -> Option<Guild> {
        self.guilds.get(&id).map(|g| g.clone())
    }

    /// Remove a guild together with its channels, members, roles and invites
    pub fn remove_guild(&self, id: Snowflake) -> Option<Guild> {
        let (_, guild) = self.guilds.remove(&id)?;

        self.channels.retain(|_, c| c.guild_id != id);
        self.members.retain(|(guild_id, _), _| *guild_id != id);
        self.roles.retain(|_, r| r.guild_id != id);
        self.invites.retain(|_, i| i.guild_id != id);

        tracing::trace!(guild_id = %id, "Guild evicted");
        Some(guild)
    }

    /// Snapshot of all cached guilds
    pub fn guilds(&self) -> Vec<Guild> {
        self.guilds.iter().map(|g| g.clone()).collect()
    }

    // ========================================================================
    // Channels
    // ========================================================================

    /// Insert a channel or merge it into the cached copy
    pub fn upsert_channel(&self, channel: Channel) -> Channel {
        let merged = {
            let mut entry = self.channels.entry(channel.id).or_default();
            if entry.id.is_zero() {
                *entry = channel;
            } else {
                entry.merge(channel);
            }
            entry.clone()
        };

        if let Some(mut guild) = self.guilds.get_mut(&merged.guild_id) {
            guild.add_channel_id(merged.id);
        }
        merged
    }

    /// Get a cached channel
    pub fn channel(&self, id: Snowflake) -> Option<Channel> {
        self.channels.get(&id).map(|c| c.clone())
    }

    /// Remove a cached channel and detach it from its guild
    pub fn remove_channel(&self, id: Snowflake) -> Option<Channel> {
        let (_, channel) = self.channels.remove(&id)?;
        if let Some(mut guild) = self.guilds.get_mut(&channel.guild_id) {
            guild.remove_channel_id(id);
        }
        Some(channel)
    }

    /// Cached channels belonging to a guild
    pub fn guild_channels(&self, guild_id: Snowflake) -> Vec<Channel> {
        self.channels
            .iter()
            .filter(|c| c.guild_id == guild_id)
            .map(|c| c.clone())
            .collect()
    }

    // ========================================================================
    // Members
    // ========================================================================

    /// Insert a member or merge it into the cached copy
    ///
    /// A nested user is stored in the user map.
    pub fn upsert_member(&self, mut member: Member) -> Member {
        if let Some(user) = member.take_user() {
            self.upsert_user(user);
        }
        let key = member.key();

        let merged = {
            let mut entry = self.members.entry(key).or_default();
            if entry.user_id.is_zero() {
                *entry = member;
            } else {
                entry.merge(member);
            }
            entry.clone()
        };

        if let Some(mut guild) = self.guilds.get_mut(&key.0) {
            guild.add_member_id(key.1);
        }
        merged
    }

    /// Get a cached member
    pub fn member(&self, guild_id: Snowflake, user_id: Snowflake) -> Option<Member> {
        self.members.get(&(guild_id, user_id)).map(|m| m.clone())
    }

    /// Remove a cached member and detach it from its guild
    pub fn remove_member(&self, guild_id: Snowflake, user_id: Snowflake) -> Option<Member> {
        let (_, member) = self.members.remove(&(guild_id, user_id))?;
        if let Some(mut guild) = self.guilds.get_mut(&guild_id) {
            guild.remove_member_id(user_id);
        }
        Some(member)
    }

    /// Cached members of a guild
    pub fn guild_members(&self, guild_id: Snowflake) -> Vec<Member> {
        self.members
            .iter()
            .filter(|m| m.key().0 == guild_id)
            .map(|m| m.value().clone())
            .collect()
    }

    /// Record a role on a cached member, creating the member if absent
    pub fn add_member_role(&self, guild_id: Snowflake, user_id: Snowflake, role_id: Snowflake) -> Member {
        let mut entry = self
            .members
            .entry((guild_id, user_id))
            .or_insert_with(|| Member::new(guild_id, user_id));
        entry.add_role(role_id);
        entry.clone()
    }

    /// Drop a role from a cached member
    pub fn remove_member_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
    ) -> Option<Member> {
        let mut entry = self.members.get_mut(&(guild_id, user_id))?;
        entry.remove_role(role_id);
        Some(entry.clone())
    }

    // ========================================================================
    // Roles
    // ========================================================================

    /// Insert a role or merge it into the cached copy
    pub fn upsert_role(&self, role: Role) -> Role {
        let mut entry = self.roles.entry(role.id).or_default();
        if entry.id.is_zero() {
            *entry = role;
        } else {
            entry.merge(role);
        }
        entry.clone()
    }

    /// Get a cached role
    pub fn role(&self, id: Snowflake) -> Option<Role> {
        self.roles.get(&id).map(|r| r.clone())
    }

    /// Remove a cached role and strip it from the guild's members
    pub fn remove_role(&self, id: Snowflake) -> Option<Role> {
        let (_, role) = self.roles.remove(&id)?;
        for mut member in self.members.iter_mut() {
            if member.key().0 == role.guild_id {
                member.remove_role(id);
            }
        }
        Some(role)
    }

    /// Cached roles of a guild, highest position first
    pub fn guild_roles(&self, guild_id: Snowflake) -> Vec<Role> {
        let mut roles: Vec<Role> = self
            .roles
            .iter()
            .filter(|r| r.guild_id == guild_id)
            .map(|r| r.clone())
            .collect();
        roles.sort_by(|a, b| b.position.cmp(&a.position));
        roles
    }

    // ========================================================================
    // Invites
    // ========================================================================

    /// Insert an invite or merge it into the cached copy
    pub fn upsert_invite(&self, invite: Invite) -> Invite {
        let mut entry = self.invites.entry(invite.code.clone()).or_default();
        if entry.code.is_empty() {
            *entry = invite;
        } else {
            entry.merge(invite);
        }
        entry.clone()
    }

    /// Get a cached invite
    pub fn invite(&self, code: &str) -> Option<Invite> {
        self.invites.get(code).map(|i| i.clone())
    }

    /// Remove a cached invite
    pub fn remove_invite(&self, code: &str) -> Option<Invite> {
        self.invites.remove(code).map(|(_, i)| i)
    }

    // ========================================================================
    // Messages
    // ========================================================================

    /// Append a message, or merge it into the buffered copy with the same id
    ///
    /// When the buffer is full the oldest message is evicted.
    pub fn upsert_message(&self, message: Message) -> Message {
        let mut messages = self.messages.lock();

        if let Some(existing) = messages.iter_mut().find(|m| m.id == message.id) {
            existing.merge(message);
            return existing.clone();
        }

        if self.max_messages == 0 {
            return message;
        }
        while messages.len() >= self.max_messages {
            messages.pop_front();
        }
        messages.push_back(message.clone());
        message
    }

    /// Get a buffered message
    pub fn message(&self, id: Snowflake) -> Option<Message> {
        self.messages.lock().iter().find(|m| m.id == id).cloned()
    }

    /// Remove a buffered message
    pub fn remove_message(&self, id: Snowflake) -> Option<Message> {
        let mut messages = self.messages.lock();
        let index = messages.iter().position(|m| m.id == id)?;
        messages.remove(index)
    }

    /// Snapshot of the buffered messages, oldest first
    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().iter().cloned().collect()
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Drop every cached entity
    pub fn clear(&self) {
        self.users.clear();
        self.guilds.clear();
        self.channels.clear();
        self.roles.clear();
        self.members.clear();
        self.invites.clear();
        self.messages.lock().clear();
        tracing::debug!("Entity store cleared");
    }

    /// Check if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.guilds.is_empty()
            && self.channels.is_empty()
            && self.roles.is_empty()
            && self.members.is_empty()
            && self.invites.is_empty()
            && self.messages.lock().is_empty()
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGES)
    }
}

impl std::fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("users", &self.users.len())
            .field("guilds", &self.guilds.len())
            .field("channels", &self.channels.len())
            .field("members", &self.members.len())
            .field("roles", &self.roles.len())
            .field("invites", &self.invites.len())
            .field("messages", &self.messages.lock().len())
            .field("max_messages", &self.max_messages)
            .finish()
    }
}
