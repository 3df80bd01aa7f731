//! Gateway connection
//!
//! Endpoint discovery, the session lifecycle, the single-writer path and
//! the observable connection state.

mod endpoint;
mod session;
mod state;
mod writer;

pub use endpoint::GatewayEndpoint;
pub use session::{GatewaySession, SessionSettings};
pub use state::{ConnectionState, ConnectionStatus};
pub use writer::{run_writer, GatewayWriter, Outbound};
