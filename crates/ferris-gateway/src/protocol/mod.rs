//! Gateway protocol definitions
//!
//! Frame format, payload shapes and close codes.

mod close_codes;
mod messages;
mod payloads;

pub use close_codes::CloseCode;
pub use messages::{GatewayFrame, IDENTIFY, PING, PONG};
pub use payloads::{
    ChannelPayload, GuildPayload, IdentifyAcceptedPayload, IdentifyPayload, InvitePayload,
    MemberPayload, MemberRolePayload, MessageDeletePayload, MessagePayload, RolePayload,
    TypingPayload, UpdatePayload, UserPayload,
};
