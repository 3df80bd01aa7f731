//! Guild entity - a server with channels and members

use serde::{Deserialize, Serialize};

use super::{merge_field, Channel, Member};
use crate::value_objects::{GuildFlags, Snowflake};

/// Guild
///
/// Payloads may nest full channel and member objects. The entity store
/// pulls them out with [`Guild::take_nested`] and keeps only ids here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Guild {
    pub id: Snowflake,
    pub owner_id: Snowflake,
    pub name: String,
    pub flags: GuildFlags,
    #[serde(skip)]
    pub channel_ids: Vec<Snowflake>,
    #[serde(skip)]
    pub member_ids: Vec<Snowflake>,
    #[serde(rename = "channels", skip_serializing)]
    nested_channels: Vec<Channel>,
    #[serde(rename = "members", skip_serializing)]
    nested_members: Vec<Member>,
}

impl Guild {
    /// Create a new Guild
    pub fn new(id: Snowflake, owner_id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            owner_id,
            name: name.into(),
            ..Self::default()
        }
    }

    /// Check if user is the guild owner
    #[inline]
    pub fn is_owner(&self, user_id: Snowflake) -> bool {
        self.owner_id == user_id
    }

    /// Move nested channel and member payloads out, keeping their ids
    ///
    /// Nested children inherit this guild's id when their own is absent.
    pub fn take_nested(&mut self) -> (Vec<Channel>, Vec<Member>) {
        let mut channels = std::mem::take(&mut self.nested_channels);
        let mut members = std::mem::take(&mut self.nested_members);

        for channel in &mut channels {
            if channel.guild_id.is_zero() {
                channel.guild_id = self.id;
            }
        }
        for member in &mut members {
            if member.guild_id.is_zero() {
                member.guild_id = self.id;
            }
        }

        if !channels.is_empty() {
            self.channel_ids = channels.iter().map(|c| c.id).collect();
        }
        if !members.is_empty() {
            self.member_ids = members.iter().map(Member::user_id).collect();
        }
        (channels, members)
    }

    /// Track a channel id if not already known
    pub fn add_channel_id(&mut self, channel_id: Snowflake) {
        if !self.channel_ids.contains(&channel_id) {
            self.channel_ids.push(channel_id);
        }
    }

    /// Forget a channel id
    pub fn remove_channel_id(&mut self, channel_id: Snowflake) {
        self.channel_ids.retain(|id| *id != channel_id);
    }

    /// Track a member's user id if not already known
    pub fn add_member_id(&mut self, user_id: Snowflake) {
        if !self.member_ids.contains(&user_id) {
            self.member_ids.push(user_id);
        }
    }

    /// Forget a member's user id
    pub fn remove_member_id(&mut self, user_id: Snowflake) {
        self.member_ids.retain(|id| *id != user_id);
    }

    /// Absorb the fields present in a newer snapshot
    pub fn merge(&mut self, other: Guild) {
        merge_field(&mut self.owner_id, other.owner_id);
        merge_field(&mut self.name, other.name);
        merge_field(&mut self.flags, other.flags);
        merge_field(&mut self.channel_ids, other.channel_ids);
        merge_field(&mut self.member_ids, other.member_ids);
    }
}
