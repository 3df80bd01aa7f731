//! Default event handler
//!
//! One method per event kind, each a no-op unless overridden. The dispatcher
//! picks the method with a `match` on the event.

use async_trait::async_trait;

use ferris_core::{Channel, Guild, Invite, Member, Message, Role, User};

use crate::events::{CallbackError, Event, Typing};

/// Error returned by a handler or callback
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result of a handler or callback
pub type CallbackResult = Result<(), BoxError>;

/// Built-in handler slot of the dispatcher
///
/// A returned error, or a panic, is reported through [`EventHandler::on_error`]
/// and any `error` callbacks.
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    async fn on_identify_accepted(&self, _user: User) -> CallbackResult {
        Ok(())
    }

    async fn on_ready(&self) -> CallbackResult {
        Ok(())
    }

    async fn on_message(&self, _message: Message) -> CallbackResult {
        Ok(())
    }

    async fn on_message_edit(&self, _old: Message, _new: Message) -> CallbackResult {
        Ok(())
    }

    async fn on_message_delete(&self, _message: Message) -> CallbackResult {
        Ok(())
    }

    async fn on_channel_create(&self, _channel: Channel) -> CallbackResult {
        Ok(())
    }

    async fn on_channel_update(&self, _old: Channel, _new: Channel) -> CallbackResult {
        Ok(())
    }

    async fn on_channel_delete(&self, _channel: Channel) -> CallbackResult {
        Ok(())
    }

    async fn on_member_create(&self, _member: Member) -> CallbackResult {
        Ok(())
    }

    async fn on_member_update(&self, _old: Member, _new: Member) -> CallbackResult {
        Ok(())
    }

    async fn on_member_delete(&self, _member: Member) -> CallbackResult {
        Ok(())
    }

    async fn on_guild_create(&self, _guild: Guild) -> CallbackResult {
        Ok(())
    }

    async fn on_guild_update(&self, _old: Guild, _new: Guild) -> CallbackResult {
        Ok(())
    }

    async fn on_guild_delete(&self, _guild: Guild) -> CallbackResult {
        Ok(())
    }

    async fn on_invite_create(&self, _invite: Invite) -> CallbackResult {
        Ok(())
    }

    async fn on_invite_delete(&self, _invite: Invite) -> CallbackResult {
        Ok(())
    }

    async fn on_role_create(&self, _role: Role) -> CallbackResult {
        Ok(())
    }

    async fn on_role_update(&self, _old: Role, _new: Role) -> CallbackResult {
        Ok(())
    }

    async fn on_role_delete(&self, _role: Role) -> CallbackResult {
        Ok(())
    }

    async fn on_typing_start(&self, _typing: Typing) -> CallbackResult {
        Ok(())
    }

    async fn on_typing_end(&self, _typing: Typing) -> CallbackResult {
        Ok(())
    }

    async fn on_member_role_add(&self, _member: Member, _role: Role) -> CallbackResult {
        Ok(())
    }

    async fn on_member_role_remove(&self, _member: Member, _role: Role) -> CallbackResult {
        Ok(())
    }

    async fn on_user_create(&self, _user: User) -> CallbackResult {
        Ok(())
    }

    async fn on_error(&self, _error: CallbackError) -> CallbackResult {
        Ok(())
    }
}

/// Route an event to the matching handler method
pub(crate) async fn invoke(handler: &dyn EventHandler, event: Event) -> CallbackResult {
    match event {
        Event::IdentifyAccepted(user) => handler.on_identify_accepted(user).await,
        Event::Ready => handler.on_ready().await,
        Event::Message(message) => handler.on_message(message).await,
        Event::MessageEdit { old, new } => handler.on_message_edit(old, new).await,
        Event::MessageDelete(message) => handler.on_message_delete(message).await,
        Event::ChannelCreate(channel) => handler.on_channel_create(channel).await,
        Event::ChannelUpdate { old, new } => handler.on_channel_update(old, new).await,
        Event::ChannelDelete(channel) => handler.on_channel_delete(channel).await,
        Event::MemberCreate(member) => handler.on_member_create(member).await,
        Event::MemberUpdate { old, new } => handler.on_member_update(old, new).await,
        Event::MemberDelete(member) => handler.on_member_delete(member).await,
        Event::GuildCreate(guild) => handler.on_guild_create(guild).await,
        Event::GuildUpdate { old, new } => handler.on_guild_update(old, new).await,
        Event::GuildDelete(guild) => handler.on_guild_delete(guild).await,
        Event::InviteCreate(invite) => handler.on_invite_create(invite).await,
        Event::InviteDelete(invite) => handler.on_invite_delete(invite).await,
        Event::RoleCreate(role) => handler.on_role_create(role).await,
        Event::RoleUpdate { old, new } => handler.on_role_update(old, new).await,
        Event::RoleDelete(role) => handler.on_role_delete(role).await,
        Event::TypingStart(typing) => handler.on_typing_start(typing).await,
        Event::TypingEnd(typing) => handler.on_typing_end(typing).await,
        Event::MemberRoleAdd { member, role } => handler.on_member_role_add(member, role).await,
        Event::MemberRoleRemove { member, role } => {
            handler.on_member_role_remove(member, role).await
        }
        Event::UserCreate(user) => handler.on_user_create(user).await,
        Event::Error(error) => handler.on_error(error).await,
    }
}
