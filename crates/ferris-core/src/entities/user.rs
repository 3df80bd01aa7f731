//! User entity - an account on the chat service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{merge_field, Guild};
use crate::value_objects::{Snowflake, UserFlags};

/// User account
///
/// The identify payload nests the user's guilds; those are moved into the
/// entity store by [`User::take_guilds`] and only their ids stay here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: Snowflake,
    pub name: String,
    pub flags: UserFlags,
    pub avatar: Option<String>,
    #[serde(skip)]
    pub guild_ids: Vec<Snowflake>,
    #[serde(rename = "guilds", skip_serializing)]
    nested_guilds: Vec<Guild>,
}

impl User {
    /// Create a new User with required fields
    pub fn new(id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    /// Check if user is a bot account
    #[inline]
    pub fn is_bot(&self) -> bool {
        self.flags.is_bot()
    }

    /// Account creation time derived from the id
    pub fn created_at(&self) -> DateTime<Utc> {
        self.id.created_at()
    }

    /// Format as a mention string
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }

    /// Move nested guild payloads out, keeping their ids
    pub fn take_guilds(&mut self) -> Vec<Guild> {
        let guilds = std::mem::take(&mut self.nested_guilds);
        if !guilds.is_empty() {
            self.guild_ids = guilds.iter().map(|g| g.id).collect();
        }
        guilds
    }

    /// Absorb the fields present in a newer snapshot
    pub fn merge(&mut self, other: User) {
        merge_field(&mut self.name, other.name);
        merge_field(&mut self.flags, other.flags);
        merge_field(&mut self.avatar, other.avatar);
        merge_field(&mut self.guild_ids, other.guild_ids);
    }
}
