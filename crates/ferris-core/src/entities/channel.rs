//! Channel entity - a text channel inside a guild

use serde::{Deserialize, Serialize};

use super::merge_field;
use crate::value_objects::Snowflake;

/// Guild text channel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Channel {
    pub id: Snowflake,
    pub name: String,
    pub guild_id: Snowflake,
}

impl Channel {
    /// Create a new Channel
    pub fn new(id: Snowflake, guild_id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            guild_id,
        }
    }

    /// Format as a mention string
    pub fn mention(&self) -> String {
        format!("<#{}>", self.id)
    }

    /// Absorb the fields present in a newer snapshot
    pub fn merge(&mut self, other: Channel) {
        merge_field(&mut self.name, other.name);
        merge_field(&mut self.guild_id, other.guild_id);
    }
}
