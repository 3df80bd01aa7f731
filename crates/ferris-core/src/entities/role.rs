//! Role entity - a named permission set inside a guild

use serde::{Deserialize, Serialize};

use super::merge_field;
use crate::value_objects::Snowflake;

/// Guild role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Role {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    pub name: String,
    /// RGB color as integer (0 = no color)
    pub color: u32,
    /// Position in hierarchy (higher = more authority)
    pub position: i32,
    pub permissions: i64,
}

impl Role {
    /// Create a new Role
    pub fn new(id: Snowflake, guild_id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            guild_id,
            name: name.into(),
            ..Self::default()
        }
    }

    /// Get color as hex string (e.g., "#FF0000")
    pub fn color_hex(&self) -> String {
        format!("#{:06X}", self.color & 0x00FF_FFFF)
    }

    /// Check if this role is higher than another in the hierarchy
    #[inline]
    pub fn is_higher_than(&self, other: &Role) -> bool {
        self.position > other.position
    }

    /// Format as a mention string
    pub fn mention(&self) -> String {
        format!("<@&{}>", self.id)
    }

    /// Absorb the fields present in a newer snapshot
    pub fn merge(&mut self, other: Role) {
        merge_field(&mut self.guild_id, other.guild_id);
        merge_field(&mut self.name, other.name);
        merge_field(&mut self.color, other.color);
        merge_field(&mut self.position, other.position);
        merge_field(&mut self.permissions, other.permissions);
    }
}
