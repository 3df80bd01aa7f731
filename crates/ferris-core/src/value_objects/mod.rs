//! Value objects - immutable types that represent domain concepts

mod flags;
mod snowflake;

pub use flags::{GuildFlags, UserFlags};
pub use snowflake::{Snowflake, SnowflakeParseError};
