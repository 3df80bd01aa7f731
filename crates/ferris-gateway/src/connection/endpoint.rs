//! Gateway endpoint discovery
//!
//! The URL from `GET /ws/info` is cached after the first success and reused
//! across reconnects. A session that fails to open the stream invalidates it
//! so the next attempt asks again.

use std::sync::Arc;

use ferris_http::HttpClient;
use parking_lot::Mutex;

use crate::error::GatewayResult;

/// Cached gateway URL
#[derive(Debug)]
pub struct GatewayEndpoint {
    http: Arc<HttpClient>,
    cached: Mutex<Option<String>>,
}

impl GatewayEndpoint {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self {
            http,
            cached: Mutex::new(None),
        }
    }

    /// Cached URL, or a fresh one from the discovery endpoint
    pub async fn resolve(&self) -> GatewayResult<String> {
        if let Some(url) = self.cached() {
            return Ok(url);
        }

        let url = self.http.ws_info().await?;
        tracing::debug!(url = %url, "Discovered gateway endpoint");
        *self.cached.lock() = Some(url.clone());
        Ok(url)
    }

    /// Currently cached URL
    pub fn cached(&self) -> Option<String> {
        self.cached.lock().clone()
    }

    /// Forget the cached URL
    pub fn invalidate(&self) {
        if self.cached.lock().take().is_some() {
            tracing::debug!("Gateway endpoint invalidated");
        }
    }
}
