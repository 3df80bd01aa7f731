//! # ferris
//!
//! Client library for the Ferris chat service.
//!
//! A [`Client`] pairs the REST layer with a gateway connection that keeps a
//! local cache of guilds, channels, members, roles and recent messages up to
//! date and hands every change to your callbacks.
//!
//! ## Example
//!
//! ```ignore
//! use ferris::prelude::*;
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl EventHandler for Echo {
//!     async fn on_message(&self, message: Message) -> CallbackResult {
//!         println!("{}", message.content);
//!         Ok(())
//!     }
//! }
//!
//! let client = ClientBuilder::from_env()?.event_handler(Echo).build()?;
//! client.on("ready", |_| async {
//!     tracing::info!("Ready");
//!     Ok(())
//! });
//!
//! tokio::spawn({
//!     let client = client.clone();
//!     async move { client.start().await }
//! });
//! client.wait_until_ready().await?;
//! ```

pub mod backoff;
pub mod builder;
pub mod client;
pub mod error;
pub mod prelude;

pub use backoff::Backoff;
pub use builder::ClientBuilder;
pub use client::Client;
pub use error::{ClientError, ClientResult};

pub use ferris_common as common;
pub use ferris_core as domain;
pub use ferris_gateway as gateway;
pub use ferris_http as http;
