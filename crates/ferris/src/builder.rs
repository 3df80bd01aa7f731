//! Client builder

use std::sync::Arc;
use std::time::Duration;

use ferris_common::{ClientConfig, Credentials};
use ferris_core::EntityStore;
use ferris_gateway::{ConnectionStatus, Dispatcher, EventHandler, EventRouter, GatewayEndpoint};
use ferris_http::HttpClient;

use crate::client::Client;
use crate::error::ClientResult;

/// Builder for [`Client`]
///
/// Starts from default settings (or a loaded [`ClientConfig`]) and
/// overrides individual values.
pub struct ClientBuilder {
    config: ClientConfig,
    handler: Option<Arc<dyn EventHandler>>,
}

impl ClientBuilder {
    pub fn new(credentials: Credentials) -> Self {
        Self::from_config(ClientConfig::new(credentials))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            config,
            handler: None,
        }
    }

    /// Builder seeded from `FERRIS_*` environment variables
    pub fn from_env() -> ClientResult<Self> {
        Ok(Self::from_config(ClientConfig::from_env()?))
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.http.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Capacity of the cached message buffer
    pub fn max_messages(mut self, max: usize) -> Self {
        self.config.cache.max_messages = max;
        self
    }

    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.config.gateway.heartbeat_interval = interval;
        self
    }

    /// Silence after which the gateway is treated as dead
    pub fn max_heartbeat_timeout(mut self, timeout: Duration) -> Self {
        self.config.gateway.max_heartbeat_timeout = timeout;
        self
    }

    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.config.http.verify_tls = verify;
        self
    }

    pub fn intents(mut self, intents: u64) -> Self {
        self.config.gateway.intents = intents;
        self
    }

    /// First reconnect delay and its ceiling
    pub fn reconnect_backoff(mut self, base: Duration, max: Duration) -> Self {
        self.config.gateway.reconnect.base = base;
        self.config.gateway.reconnect.max = max;
        self
    }

    /// Delay before an unanswered typing start is ended; zero disables it
    pub fn typing_timeout(mut self, timeout: Duration) -> Self {
        self.config.gateway.typing_timeout = timeout;
        self
    }

    /// Default handler invoked for every event before registered callbacks
    pub fn event_handler(mut self, handler: impl EventHandler) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Settings as they will be used
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the client
    ///
    /// Nothing connects until [`Client::start`] is called.
    ///
    /// # Errors
    /// Fails if the REST base URL does not parse or the HTTP client cannot
    /// be constructed.
    pub fn build(self) -> ClientResult<Client> {
        let config = self.config;

        let token = match &config.credentials {
            Credentials::Token(token) => Some(token.clone()),
            Credentials::EmailPassword { .. } => None,
        };
        let http = Arc::new(HttpClient::new(&config.http, token)?);

        let store = EntityStore::new_shared(config.cache.max_messages);
        let dispatcher = self
            .handler
            .map_or_else(Dispatcher::new, Dispatcher::with_handler);
        let status = ConnectionStatus::new();
        let router = Arc::new(EventRouter::new(
            Arc::clone(&store),
            dispatcher,
            status,
            config.gateway.typing_timeout,
        ));
        let endpoint = GatewayEndpoint::new(Arc::clone(&http));

        tracing::debug!(
            api_base_url = %config.http.api_base_url,
            max_messages = config.cache.max_messages,
            "Client built"
        );

        Ok(Client::from_parts(config, http, router, endpoint))
    }
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("config", &self.config)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}
