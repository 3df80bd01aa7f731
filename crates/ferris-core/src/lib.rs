//! # ferris-core
//!
//! Domain layer: snowflake ids, entity models decoded from wire payloads, and
//! the entity store that the gateway keeps up to date.
//! This crate has no dependency on any transport.

pub mod cache;
pub mod entities;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use cache::{EntityStore, DEFAULT_MAX_MESSAGES};
pub use entities::{Channel, Guild, Invite, Member, Message, Role, User};
pub use value_objects::{GuildFlags, Snowflake, SnowflakeParseError, UserFlags};
