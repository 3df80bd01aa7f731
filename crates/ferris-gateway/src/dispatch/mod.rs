//! Event dispatch
//!
//! The dispatcher, its callback registry and the default handler trait.

mod dispatcher;
mod handler;
mod registry;

pub use dispatcher::{DispatchHandle, Dispatcher};
pub use handler::{BoxError, CallbackResult, EventHandler};
pub use registry::{callback, Callback, HandlerRegistry, ListenerId};
