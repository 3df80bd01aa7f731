//! Invite entity - a code that lets a user join a guild

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::merge_field;
use crate::value_objects::Snowflake;

/// Guild invite
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Invite {
    pub code: String,
    pub owner_id: Snowflake,
    pub guild_id: Snowflake,
    /// Seconds since the Ferris epoch
    pub created_at: i64,
    pub uses: u32,
    /// Maximum uses (None = unlimited)
    pub max_uses: Option<u32>,
    /// Lifetime in seconds (None = never expires)
    pub max_age: Option<i64>,
}

impl Invite {
    /// Ferris epoch in whole seconds
    const EPOCH_SECS: i64 = Snowflake::EPOCH / 1000;

    /// Creation time, or None if the server sent an unrepresentable value
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let secs = self.created_at.checked_add(Self::EPOCH_SECS)?;
        Utc.timestamp_opt(secs, 0).single()
    }

    /// Point in time after which the invite stops working
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let max_age = self.max_age.filter(|age| *age > 0)?;
        Some(self.created_at()? + Duration::seconds(max_age))
    }

    /// Check if the invite has expired at the given instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|at| now >= at)
    }

    /// Check if the invite has reached its maximum uses
    pub fn is_maxed_out(&self) -> bool {
        self.max_uses.is_some_and(|max| max > 0 && self.uses >= max)
    }

    /// Get the full invite URL path
    pub fn url(&self) -> String {
        format!("/invite/{}", self.code)
    }

    /// Absorb the fields present in a newer snapshot
    pub fn merge(&mut self, other: Invite) {
        merge_field(&mut self.owner_id, other.owner_id);
        merge_field(&mut self.guild_id, other.guild_id);
        merge_field(&mut self.created_at, other.created_at);
        merge_field(&mut self.uses, other.uses);
        merge_field(&mut self.max_uses, other.max_uses);
        merge_field(&mut self.max_age, other.max_age);
    }
}
