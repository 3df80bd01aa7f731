//! REST endpoint helpers
//!
//! Thin wrappers that build a [`Route`], send it, and decode the payload.

use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};

use ferris_common::Token;
use ferris_core::{Channel, Guild, Invite, Member, Message, Role, Snowflake, User};

use crate::client::HttpClient;
use crate::error::HttpResult;
use crate::route::Route;

/// Optional fields when creating a role
#[derive(Debug, Clone, Default)]
pub struct RoleOptions {
    pub color: Option<u32>,
    pub position: Option<i32>,
    pub permissions: Option<i64>,
}

impl RoleOptions {
    fn into_body(self, name: Option<&str>) -> Value {
        let mut body = serde_json::Map::new();
        if let Some(name) = name {
            body.insert("name".to_string(), json!(name));
        }
        if let Some(color) = self.color {
            body.insert("color".to_string(), json!(color));
        }
        if let Some(position) = self.position {
            body.insert("position".to_string(), json!(position));
        }
        if let Some(permissions) = self.permissions {
            body.insert("permissions".to_string(), json!(permissions));
        }
        Value::Object(body)
    }
}

impl HttpClient {
    /// Discover the gateway URL
    pub async fn ws_info(&self) -> HttpResult<String> {
        #[derive(Deserialize)]
        struct WsInfo {
            url: String,
        }

        let info: WsInfo = self
            .request_as(Route::new(Method::GET, "/ws/info"), None)
            .await?;
        Ok(info.url)
    }

    /// Exchange email and password for a session token
    ///
    /// The token is not stored; call [`HttpClient::set_token`] with it.
    pub async fn login(&self, email: &str, password: &str) -> HttpResult<Token> {
        #[derive(Deserialize)]
        struct AuthResponse {
            token: String,
        }

        let body = json!({ "email": email, "password": password });
        let value = self
            .request_anonymous(Route::new(Method::POST, "/auth"), Some(body))
            .await?;
        let response: AuthResponse = serde_json::from_value(value)?;
        Ok(Token::new(response.token))
    }

    // ========================================================================
    // Guilds
    // ========================================================================

    pub async fn create_guild(&self, name: &str) -> HttpResult<Guild> {
        self.request_as(
            Route::new(Method::POST, "/guilds"),
            Some(json!({ "name": name })),
        )
        .await
    }

    /// Fetch a guild, optionally with its members and channels nested
    pub async fn fetch_guild(
        &self,
        guild_id: Snowflake,
        members: bool,
        channels: bool,
    ) -> HttpResult<Guild> {
        let route = Route::new(Method::GET, "/guilds/{guild_id}")
            .param(guild_id)
            .query("members", members)
            .query("channels", channels);
        self.request_as(route, None).await
    }

    pub async fn delete_guild(&self, guild_id: Snowflake) -> HttpResult<()> {
        let route = Route::new(Method::DELETE, "/guilds/{guild_id}").param(guild_id);
        self.request(route, None).await.map(drop)
    }

    // ========================================================================
    // Channels
    // ========================================================================

    pub async fn create_channel(&self, guild_id: Snowflake, name: &str) -> HttpResult<Channel> {
        let route = Route::new(Method::POST, "/guilds/{guild_id}/channels").param(guild_id);
        self.request_as(route, Some(json!({ "name": name }))).await
    }

    pub async fn fetch_channel(&self, channel_id: Snowflake) -> HttpResult<Channel> {
        let route = Route::new(Method::GET, "/channels/{channel_id}").param(channel_id);
        self.request_as(route, None).await
    }

    pub async fn delete_channel(&self, channel_id: Snowflake) -> HttpResult<()> {
        let route = Route::new(Method::DELETE, "/channels/{channel_id}").param(channel_id);
        self.request(route, None).await.map(drop)
    }

    // ========================================================================
    // Messages
    // ========================================================================

    pub async fn send_message(&self, channel_id: Snowflake, content: &str) -> HttpResult<Message> {
        let route = Route::new(Method::POST, "/channels/{channel_id}/messages").param(channel_id);
        self.request_as(route, Some(json!({ "content": content }))).await
    }

    pub async fn fetch_message(&self, message_id: Snowflake) -> HttpResult<Message> {
        let route = Route::new(Method::GET, "/messages/{message_id}").param(message_id);
        self.request_as(route, None).await
    }

    pub async fn edit_message(&self, message_id: Snowflake, content: &str) -> HttpResult<Message> {
        let route = Route::new(Method::PATCH, "/messages/{message_id}").param(message_id);
        self.request_as(route, Some(json!({ "content": content }))).await
    }

    pub async fn delete_message(&self, message_id: Snowflake) -> HttpResult<()> {
        let route = Route::new(Method::DELETE, "/messages/{message_id}").param(message_id);
        self.request(route, None).await.map(drop)
    }

    // ========================================================================
    // Users and members
    // ========================================================================

    pub async fn fetch_user(&self, user_id: Snowflake) -> HttpResult<User> {
        let route = Route::new(Method::GET, "/users/{user_id}").param(user_id);
        self.request_as(route, None).await
    }

    pub async fn fetch_member(&self, guild_id: Snowflake, user_id: Snowflake) -> HttpResult<Member> {
        let route = Route::new(Method::GET, "/guilds/{guild_id}/members/{user_id}")
            .param(guild_id)
            .param(user_id);
        self.request_as(route, None).await
    }

    pub async fn add_member_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
    ) -> HttpResult<()> {
        let route = Route::new(Method::POST, "/guilds/{guild_id}/members/{user_id}/role/{role_id}")
            .param(guild_id)
            .param(user_id)
            .param(role_id);
        self.request(route, None).await.map(drop)
    }

    pub async fn remove_member_role(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_id: Snowflake,
    ) -> HttpResult<()> {
        let route = Route::new(Method::DELETE, "/guilds/{guild_id}/members/{user_id}/role/{role_id}")
            .param(guild_id)
            .param(user_id)
            .param(role_id);
        self.request(route, None).await.map(drop)
    }

    // ========================================================================
    // Invites
    // ========================================================================

    /// Create an invite; `None` leaves the limit to the server default
    pub async fn create_invite(
        &self,
        guild_id: Snowflake,
        max_age: Option<i64>,
        max_uses: Option<u32>,
    ) -> HttpResult<Invite> {
        let route = Route::new(Method::POST, "/guilds/{guild_id}/invites").param(guild_id);
        let body = json!({ "max_age": max_age, "max_uses": max_uses });
        self.request_as(route, Some(body)).await
    }

    /// Join the guild behind an invite code
    pub async fn use_invite(&self, code: &str) -> HttpResult<Member> {
        let route = Route::new(Method::POST, "/invites/{code}").param(code);
        self.request_as(route, None).await
    }

    // ========================================================================
    // Roles
    // ========================================================================

    pub async fn create_role(
        &self,
        guild_id: Snowflake,
        name: &str,
        options: RoleOptions,
    ) -> HttpResult<Role> {
        let route = Route::new(Method::POST, "/guilds/{guild_id}/roles").param(guild_id);
        self.request_as(route, Some(options.into_body(Some(name)))).await
    }

    /// Patch a role; only the fields that are set are sent
    pub async fn edit_role(
        &self,
        guild_id: Snowflake,
        role_id: Snowflake,
        name: Option<&str>,
        options: RoleOptions,
    ) -> HttpResult<Role> {
        let route = Route::new(Method::PATCH, "/guilds/{guild_id}/roles/{role_id}")
            .param(guild_id)
            .param(role_id);
        self.request_as(route, Some(options.into_body(name))).await
    }

    pub async fn delete_role(&self, guild_id: Snowflake, role_id: Snowflake) -> HttpResult<()> {
        let route = Route::new(Method::DELETE, "/guilds/{guild_id}/roles/{role_id}")
            .param(guild_id)
            .param(role_id);
        self.request(route, None).await.map(drop)
    }
}
