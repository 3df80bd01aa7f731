//! Common imports for writing a bot
//!
//! ```ignore
//! use ferris::prelude::*;
//! ```

pub use async_trait::async_trait;

pub use crate::{Client, ClientBuilder, ClientError, ClientResult};
pub use ferris_common::{Credentials, Token};
pub use ferris_core::{Channel, Guild, Invite, Member, Message, Role, Snowflake, User};
pub use ferris_gateway::{CallbackError, CallbackResult, ConnectionState, Event, EventHandler, Typing};
