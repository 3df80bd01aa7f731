//! Wire payloads for tests
//!
//! Ids are sent as strings, the way the server encodes snowflakes.

use serde_json::{json, Value};

pub fn user(id: u64, name: &str) -> Value {
    json!({ "id": id.to_string(), "name": name, "flags": 0, "avatar": null })
}

/// User with one guild nested, as the identify payload carries it
pub fn user_with_guild(id: u64, name: &str, guild: Value) -> Value {
    let mut user = user(id, name);
    user["guilds"] = json!([guild]);
    user
}

pub fn guild(id: u64, owner_id: u64, name: &str) -> Value {
    json!({
        "id": id.to_string(),
        "owner_id": owner_id.to_string(),
        "name": name,
        "flags": 0,
    })
}

/// Guild with nested channels and members
pub fn guild_with(id: u64, owner_id: u64, name: &str, channels: Vec<Value>, members: Vec<Value>) -> Value {
    let mut guild = guild(id, owner_id, name);
    guild["channels"] = Value::Array(channels);
    guild["members"] = Value::Array(members);
    guild
}

pub fn channel(id: u64, guild_id: u64, name: &str) -> Value {
    json!({ "id": id.to_string(), "guild_id": guild_id.to_string(), "name": name })
}

pub fn member(guild_id: u64, user_id: u64) -> Value {
    json!({ "guild_id": guild_id.to_string(), "user_id": user_id.to_string() })
}

pub fn message(id: u64, channel_id: u64, author_id: u64, content: &str) -> Value {
    json!({
        "id": id.to_string(),
        "channel_id": channel_id.to_string(),
        "author_id": author_id.to_string(),
        "content": content,
    })
}

pub fn role(id: u64, guild_id: u64, name: &str) -> Value {
    json!({
        "id": id.to_string(),
        "guild_id": guild_id.to_string(),
        "name": name,
        "color": 0,
        "position": 0,
        "permissions": 0,
    })
}
