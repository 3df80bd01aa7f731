//! # ferris-gateway
//!
//! Client side of the Ferris gateway: a persistent WebSocket session that
//! identifies, keeps itself alive with heartbeats on a dedicated thread,
//! routes inbound frames into the entity store and fans normalized events
//! out to user callbacks.
//!
//! ```text
//! GatewaySession ──frames──▶ EventRouter ──Event──▶ Dispatcher ──▶ callbacks
//!       ▲    │                    │                     └────────▶ EventHandler
//!       │    └─ GatewayWriter ◀───┤ (pong)
//!       │           ▲             └──▶ EntityStore
//!       └───────────┴── HeartbeatManager (own thread)
//! ```

pub mod connection;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod handlers;
pub mod heartbeat;
pub mod protocol;

pub use connection::{
    ConnectionState, ConnectionStatus, GatewayEndpoint, GatewaySession, GatewayWriter,
    SessionSettings,
};
pub use dispatch::{
    callback, BoxError, Callback, CallbackResult, DispatchHandle, Dispatcher, EventHandler,
    HandlerRegistry, ListenerId,
};
pub use error::{GatewayError, GatewayResult};
pub use events::{CallbackError, Event, EventKind, GatewayEventType, Typing};
pub use handlers::{EventRouter, HandlerError, SessionContext};
pub use heartbeat::{HeartbeatManager, HeartbeatSettings, Liveness};
pub use protocol::{CloseCode, GatewayFrame};
