//! Message entity - a message posted in a channel

use serde::{Deserialize, Serialize};

use super::merge_field;
use crate::value_objects::Snowflake;

/// Chat message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    pub id: Snowflake,
    pub content: String,
    pub channel_id: Snowflake,
    pub author_id: Snowflake,
}

impl Message {
    /// Create a new Message
    pub fn new(
        id: Snowflake,
        channel_id: Snowflake,
        author_id: Snowflake,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            content: content.into(),
            channel_id,
            author_id,
        }
    }

    /// Check if the message carries any text
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Absorb the fields present in a newer snapshot
    pub fn merge(&mut self, other: Message) {
        merge_field(&mut self.content, other.content);
        merge_field(&mut self.channel_id, other.channel_id);
        merge_field(&mut self.author_id, other.author_id);
    }
}
