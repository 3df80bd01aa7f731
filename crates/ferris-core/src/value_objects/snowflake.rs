//! Snowflake ID - 128-bit identifier carrying its creation time
//!
//! Structure:
//! - Bits 127-64: Timestamp (milliseconds since the Ferris epoch)
//! - Bits 63-0: Assigned by the server (node, sequence)
//!
//! The client never generates ids; it only reads the timestamp back out and
//! builds lower-bound ids for time-based queries.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Ferris Snowflake ID (128-bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Snowflake(u128);

impl Snowflake {
    /// Ferris epoch: 2020-01-01 00:00:00 UTC (milliseconds)
    pub const EPOCH: i64 = 1_577_836_800_000;

    /// Number of low bits below the timestamp
    const TIMESTAMP_SHIFT: u32 = 64;

    /// Create a new Snowflake from a raw value
    #[inline]
    pub const fn new(id: u128) -> Self {
        Self(id)
    }

    /// Get the inner value
    #[inline]
    pub const fn into_inner(self) -> u128 {
        self.0
    }

    /// Check if the Snowflake is zero (absent in the payload)
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Extract timestamp (milliseconds since Unix epoch)
    #[inline]
    pub fn timestamp(&self) -> i64 {
        let offset = i64::try_from(self.0 >> Self::TIMESTAMP_SHIFT).unwrap_or(i64::MAX - Self::EPOCH);
        offset.saturating_add(Self::EPOCH)
    }

    /// Convert timestamp to DateTime<Utc>
    pub fn created_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.timestamp())
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Smallest snowflake that could have been created at `at`
    ///
    /// Useful as a `before`/`after` bound when paginating by time.
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        let millis = (at.timestamp_millis() - Self::EPOCH).max(0) as u128;
        Self(millis << Self::TIMESTAMP_SHIFT)
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Result<Self, SnowflakeParseError> {
        s.trim()
            .parse::<u128>()
            .map(Snowflake)
            .map_err(|_| SnowflakeParseError::InvalidFormat)
    }
}

/// Error when parsing a Snowflake from string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SnowflakeParseError {
    #[error("invalid snowflake format")]
    InvalidFormat,
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for Snowflake {
    fn from(id: u128) -> Self {
        Self(id)
    }
}

impl From<u64> for Snowflake {
    fn from(id: u64) -> Self {
        Self(u128::from(id))
    }
}

impl From<Snowflake> for u128 {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

impl std::str::FromStr for Snowflake {
    type Err = SnowflakeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Snowflake::parse(s)
    }
}

// Serialize as string; 128-bit integers do not survive most JSON parsers
impl Serialize for Snowflake {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

// Deserialize from string or number; the server has sent both over time
impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct SnowflakeVisitor;

        impl Visitor<'_> for SnowflakeVisitor {
            type Value = Snowflake;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer representing a snowflake ID")
            }

            fn visit_i64<E>(self, value: i64) -> Result<Snowflake, E>
            where
                E: de::Error,
            {
                u128::try_from(value)
                    .map(Snowflake)
                    .map_err(|_| de::Error::custom("snowflake must not be negative"))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Snowflake, E>
            where
                E: de::Error,
            {
                Ok(Snowflake(u128::from(value)))
            }

            fn visit_u128<E>(self, value: u128) -> Result<Snowflake, E>
            where
                E: de::Error,
            {
                Ok(Snowflake(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Snowflake, E>
            where
                E: de::Error,
            {
                Snowflake::parse(value).map_err(|_| de::Error::custom("invalid snowflake string"))
            }
        }

        deserializer.deserialize_any(SnowflakeVisitor)
    }
}
