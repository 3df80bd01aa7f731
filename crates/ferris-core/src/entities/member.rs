//! Member entity - a user's membership in a guild

use serde::{Deserialize, Serialize};

use super::{merge_field, User};
use crate::value_objects::Snowflake;

/// Guild membership, keyed by `(guild_id, user_id)`
///
/// The payload may nest the full user; [`Member::take_user`] moves it out so
/// the user can be stored on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Member {
    pub user_id: Snowflake,
    pub guild_id: Snowflake,
    #[serde(skip)]
    pub role_ids: Vec<Snowflake>,
    #[serde(rename = "user", skip_serializing)]
    nested_user: Option<User>,
}

impl Member {
    /// Create a new Member
    pub fn new(guild_id: Snowflake, user_id: Snowflake) -> Self {
        Self {
            user_id,
            guild_id,
            ..Self::default()
        }
    }

    /// The member's user id, falling back to the nested user's id
    pub fn user_id(&self) -> Snowflake {
        if self.user_id.is_zero() {
            self.nested_user.as_ref().map(|u| u.id).unwrap_or_default()
        } else {
            self.user_id
        }
    }

    /// Store key for this membership
    pub fn key(&self) -> (Snowflake, Snowflake) {
        (self.guild_id, self.user_id())
    }

    /// Move the nested user out, if the payload carried one
    pub fn take_user(&mut self) -> Option<User> {
        let user = self.nested_user.take()?;
        if self.user_id.is_zero() {
            self.user_id = user.id;
        }
        Some(user)
    }

    /// Check if member has a specific role
    #[inline]
    pub fn has_role(&self, role_id: Snowflake) -> bool {
        self.role_ids.contains(&role_id)
    }

    /// Add a role to the member
    pub fn add_role(&mut self, role_id: Snowflake) {
        if !self.role_ids.contains(&role_id) {
            self.role_ids.push(role_id);
        }
    }

    /// Remove a role from the member
    pub fn remove_role(&mut self, role_id: Snowflake) {
        self.role_ids.retain(|&id| id != role_id);
    }

    /// Format as a mention string
    pub fn mention(&self) -> String {
        format!("<@{}>", self.user_id())
    }

    /// Absorb the fields present in a newer snapshot
    pub fn merge(&mut self, other: Member) {
        merge_field(&mut self.role_ids, other.role_ids);
    }
}
