//! Heartbeat and liveness
//!
//! A dedicated thread pings the peer and closes the connection when the
//! peer goes silent for longer than the configured timeout.

mod liveness;
mod manager;

pub use liveness::{Liveness, HIGH_LATENCY};
pub use manager::{HeartbeatManager, HeartbeatSettings};
