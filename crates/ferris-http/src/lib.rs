//! # ferris-http
//!
//! REST request layer for the Ferris chat API.
//!
//! ## Features
//!
//! - **Routes**: method plus path template, percent-encoded parameters
//! - **Rate limiting**: one shared gate per route template, reopened after `retry_after`
//! - **Retries**: 5xx retried within a fixed attempt budget
//! - **Typed errors**: 400/401/403/404 surface as distinct variants
//!
//! ## Example
//!
//! ```ignore
//! use ferris_http::HttpClient;
//!
//! let http = HttpClient::new(&config.http, Some(token))?;
//! let channel = http.fetch_channel(channel_id).await?;
//! http.send_message(channel.id, "hello").await?;
//! ```

pub mod client;
pub mod endpoints;
pub mod error;
pub mod ratelimit;
pub mod route;

pub use client::{HttpClient, MAX_ATTEMPTS, USER_AGENT};
pub use endpoints::RoleOptions;
pub use error::{ErrorLocation, HttpError, HttpResult};
pub use ratelimit::{Bucket, BucketMap};
pub use route::{BucketKey, Route};

pub use reqwest::Method;
