//! Event handlers
//!
//! The router maps each inbound frame to a routine that reconciles the
//! entity store and dispatches a normalized event. Frames are handled one at
//! a time, in arrival order, by the session's read loop.

mod channels;
mod error;
mod guilds;
mod heartbeat;
mod identify;
mod invites;
mod members;
mod messages;
mod roles;
mod typing;
mod users;

pub use channels::ChannelHandler;
pub use error::{HandlerError, HandlerResult};
pub use guilds::GuildHandler;
pub use heartbeat::HeartbeatHandler;
pub use identify::IdentifyHandler;
pub use invites::InviteHandler;
pub use members::MemberHandler;
pub use messages::MessageHandler;
pub use roles::RoleHandler;
pub use typing::{TypingHandler, TypingTimers};
pub use users::UserHandler;

use std::sync::Arc;
use std::time::Duration;

use ferris_core::{EntityStore, Snowflake};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;

use crate::connection::{ConnectionStatus, GatewayWriter};
use crate::dispatch::Dispatcher;
use crate::events::GatewayEventType;
use crate::heartbeat::Liveness;
use crate::protocol::GatewayFrame;

/// Per-session handles the routines need
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub writer: GatewayWriter,
    pub liveness: Arc<Liveness>,
}

/// Routes inbound frames
///
/// Lives as long as the client; sessions come and go around it.
pub struct EventRouter {
    store: Arc<EntityStore>,
    dispatcher: Dispatcher,
    status: ConnectionStatus,
    typing: TypingTimers,
    current_user: RwLock<Option<Snowflake>>,
    latency: RwLock<Option<Duration>>,
}

impl EventRouter {
    pub fn new(
        store: Arc<EntityStore>,
        dispatcher: Dispatcher,
        status: ConnectionStatus,
        typing_timeout: Duration,
    ) -> Self {
        Self {
            store,
            dispatcher,
            status,
            typing: TypingTimers::new(typing_timeout),
            current_user: RwLock::new(None),
            latency: RwLock::new(None),
        }
    }

    /// Handle one inbound frame
    ///
    /// Unknown events are logged and dropped.
    pub fn handle(&self, frame: GatewayFrame, ctx: &SessionContext) -> HandlerResult<()> {
        let Some(event) = GatewayEventType::from_str(frame.name()) else {
            tracing::warn!(event = frame.name(), "Unknown gateway event, dropping");
            return Ok(());
        };

        tracing::trace!(event = %event, "Routing frame");

        match event {
            GatewayEventType::Ping => HeartbeatHandler::ping(ctx),
            GatewayEventType::Pong => HeartbeatHandler::pong(self, ctx),
            GatewayEventType::IdentifyAccepted => {
                IdentifyHandler::handle(self, decode(event, frame)?)
            }
            GatewayEventType::MessageCreate => MessageHandler::create(self, decode(event, frame)?),
            GatewayEventType::MessageUpdate => MessageHandler::update(self, decode(event, frame)?),
            GatewayEventType::MessageDelete => MessageHandler::delete(self, decode(event, frame)?),
            GatewayEventType::ChannelCreate => ChannelHandler::create(self, decode(event, frame)?),
            GatewayEventType::ChannelUpdate => ChannelHandler::update(self, decode(event, frame)?),
            GatewayEventType::ChannelDelete => ChannelHandler::delete(self, decode(event, frame)?),
            GatewayEventType::MemberCreate => MemberHandler::create(self, decode(event, frame)?),
            GatewayEventType::MemberUpdate => MemberHandler::update(self, decode(event, frame)?),
            GatewayEventType::MemberDelete => MemberHandler::delete(self, decode(event, frame)?),
            GatewayEventType::GuildCreate => GuildHandler::create(self, decode(event, frame)?),
            GatewayEventType::GuildUpdate => GuildHandler::update(self, decode(event, frame)?),
            GatewayEventType::GuildDelete => GuildHandler::delete(self, decode(event, frame)?),
            GatewayEventType::InviteCreate => InviteHandler::create(self, decode(event, frame)?),
            GatewayEventType::InviteDelete => InviteHandler::delete(self, decode(event, frame)?),
            GatewayEventType::RoleCreate => RoleHandler::create(self, decode(event, frame)?),
            GatewayEventType::RoleUpdate => RoleHandler::update(self, decode(event, frame)?),
            GatewayEventType::RoleDelete => RoleHandler::delete(self, decode(event, frame)?),
            GatewayEventType::TypingStart => TypingHandler::start(self, decode(event, frame)?),
            GatewayEventType::TypingEnd => TypingHandler::end(self, decode(event, frame)?),
            GatewayEventType::MemberRoleAdd => MemberHandler::role_add(self, decode(event, frame)?),
            GatewayEventType::MemberRoleRemove => {
                MemberHandler::role_remove(self, decode(event, frame)?)
            }
            GatewayEventType::UserCreate => UserHandler::create(self, decode(event, frame)?),
        }
    }

    /// Cancel work scheduled by the session that just ended
    pub fn end_session(&self) {
        self.typing.cancel_all();
    }

    /// Entity store the routines write to
    #[inline]
    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    #[inline]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    #[inline]
    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    #[inline]
    pub fn typing(&self) -> &TypingTimers {
        &self.typing
    }

    /// Id of the user this client is logged in as
    pub fn current_user(&self) -> Option<Snowflake> {
        *self.current_user.read()
    }

    pub(crate) fn set_current_user(&self, id: Snowflake) {
        *self.current_user.write() = Some(id);
    }

    /// Latest heartbeat round trip
    pub fn latency(&self) -> Option<Duration> {
        *self.latency.read()
    }

    pub(crate) fn set_latency(&self, latency: Duration) {
        *self.latency.write() = Some(latency);
    }
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRouter")
            .field("store", &self.store)
            .field("status", &self.status.get())
            .field("pending_typing", &self.typing.len())
            .field("current_user", &self.current_user())
            .finish()
    }
}

fn decode<T: DeserializeOwned>(event: GatewayEventType, frame: GatewayFrame) -> HandlerResult<T> {
    let data = frame.d.ok_or(HandlerError::MissingData {
        event: event.as_str(),
    })?;
    serde_json::from_value(data).map_err(|source| HandlerError::InvalidPayload {
        event: event.as_str(),
        source,
    })
}
