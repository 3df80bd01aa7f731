//! Gateway events
//!
//! Inbound event names and the normalized events dispatched to user code.

mod event;
mod event_types;

pub use event::{normalize_name, CallbackError, Event, EventKind, Typing};
pub use event_types::GatewayEventType;
