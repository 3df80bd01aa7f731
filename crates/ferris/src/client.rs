//! Client and its reconnect loop
//!
//! [`Client::start`] owns the gateway: it opens a session, waits for it to
//! end, and opens the next one after a backoff delay. Only [`Client::close`]
//! or an error that no reconnect can fix (a rejected token) ends the loop.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use ferris_common::{ClientConfig, Credentials, Token};
use ferris_core::{Channel, EntityStore, Guild, Invite, Member, Message, Role, Snowflake, User};
use ferris_gateway::{
    CallbackResult, ConnectionState, Dispatcher, Event, EventHandler, EventRouter, GatewayEndpoint,
    GatewayError, GatewaySession, ListenerId, SessionSettings,
};
use ferris_http::{HttpClient, RoleOptions};
use tokio::sync::watch;

use crate::backoff::Backoff;
use crate::error::{ClientError, ClientResult};

/// Handle to a Ferris client
///
/// Cheap to clone; clones share one connection, cache and registry.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    http: Arc<HttpClient>,
    router: Arc<EventRouter>,
    endpoint: GatewayEndpoint,
    running: watch::Sender<bool>,
}

/// Clears the running flag however the loop exits
struct RunningGuard<'a>(&'a watch::Sender<bool>);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}

impl Client {
    pub(crate) fn from_parts(
        config: ClientConfig,
        http: Arc<HttpClient>,
        router: Arc<EventRouter>,
        endpoint: GatewayEndpoint,
    ) -> Self {
        let (running, _) = watch::channel(false);
        Self {
            inner: Arc::new(ClientInner {
                config,
                http,
                router,
                endpoint,
                running,
            }),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Connect and keep the gateway connected until [`Client::close`]
    ///
    /// Returns `Ok(())` once the client is closed.
    ///
    /// # Errors
    /// - [`ClientError::Closed`] if the client was already closed
    /// - [`ClientError::AlreadyRunning`] if another call is still running
    /// - [`ClientError::Http`] if logging in with email and password fails
    /// - [`ClientError::Gateway`] if the gateway rejects the token
    pub async fn start(&self) -> ClientResult<()> {
        let inner = &self.inner;
        if inner.router.status().is_closed() {
            return Err(ClientError::Closed);
        }
        if !inner.running.send_if_modified(|running| !std::mem::replace(running, true)) {
            return Err(ClientError::AlreadyRunning);
        }
        let _guard = RunningGuard(&inner.running);

        let token = tokio::select! {
            token = self.authenticate() => token?,
            () = inner.router.status().wait_closed() => return Ok(()),
        };

        self.run_sessions(token).await
    }

    async fn authenticate(&self) -> ClientResult<Token> {
        let http = &self.inner.http;
        if let Some(token) = http.token() {
            return Ok(token);
        }

        match &self.inner.config.credentials {
            Credentials::Token(token) => Ok(token.clone()),
            Credentials::EmailPassword { email, password } => {
                tracing::debug!(email = %email, "Logging in");
                let token = http.login(email, password).await?;
                http.set_token(token.clone());
                tracing::info!("Logged in");
                Ok(token)
            }
        }
    }

    async fn run_sessions(&self, token: Token) -> ClientResult<()> {
        let inner = &self.inner;
        let status = inner.router.status();
        let settings = SessionSettings::from_config(&inner.config);
        let mut backoff = Backoff::new(inner.config.gateway.reconnect);

        loop {
            if status.is_closed() {
                return Ok(());
            }

            let (result, reached_ready) = self
                .watch_ready(self.run_session(&token, settings))
                .await;

            let error = match result {
                Ok(()) => return Ok(()),
                Err(_) if status.is_closed() => return Ok(()),
                Err(e) => e,
            };

            if !error.is_reconnectable() {
                tracing::error!(error = %error, "Gateway failed permanently");
                status.transition(ConnectionState::Disconnected);
                return Err(error.into());
            }
            if error.is_connect_failure() {
                inner.endpoint.invalidate();
            }
            if reached_ready {
                backoff.reset();
            }

            let delay = backoff.next_delay();
            status.transition(ConnectionState::Reconnecting);
            tracing::info!(
                error = %error,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "Reconnecting"
            );

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = status.wait_closed() => return Ok(()),
            }
        }
    }

    async fn run_session(&self, token: &Token, settings: SessionSettings) -> Result<(), GatewayError> {
        let inner = &self.inner;
        // Discovery is part of connecting
        inner.router.status().transition(ConnectionState::Connecting);
        let url = tokio::select! {
            url = inner.endpoint.resolve() => url?,
            () = inner.router.status().wait_closed() => return Ok(()),
        };

        GatewaySession::new(url, token.clone(), settings, Arc::clone(&inner.router))
            .run()
            .await
    }

    /// Drive `session` and report whether it reached ready along the way
    async fn watch_ready<F>(&self, session: F) -> (F::Output, bool)
    where
        F: Future,
    {
        let status = self.inner.router.status();
        tokio::pin!(session);

        let mut watching = true;
        let mut reached_ready = false;
        loop {
            tokio::select! {
                output = &mut session => return (output, reached_ready),
                ready = status.wait_ready(), if watching => {
                    watching = false;
                    reached_ready = ready;
                }
            }
        }
    }

    /// Close the client and wait for the gateway session to shut down
    ///
    /// Safe to call more than once and from any clone.
    pub async fn close(&self) {
        let router = &self.inner.router;
        if router.status().close() {
            tracing::info!("Client closing");
        }
        router.typing().cancel_all();

        let mut running = self.inner.running.subscribe();
        let _ = running.wait_for(|running| !running).await;
    }

    /// Wait until the gateway has accepted the identify
    ///
    /// Waits for the next ready if the client is currently reconnecting.
    ///
    /// # Errors
    /// [`ClientError::Closed`] if the client closed first.
    pub async fn wait_until_ready(&self) -> ClientResult<()> {
        if self.inner.router.status().wait_ready().await {
            Ok(())
        } else {
            Err(ClientError::Closed)
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.router.status().get()
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.state().is_closed()
    }

    /// Whether [`Client::start`] is currently running
    pub fn is_running(&self) -> bool {
        *self.inner.running.borrow()
    }

    /// Latest heartbeat round trip
    pub fn latency(&self) -> Option<Duration> {
        self.inner.router.latency()
    }

    /// The logged-in user, once identified
    pub fn user(&self) -> Option<User> {
        let id = self.inner.router.current_user()?;
        self.inner.router.store().user(id)
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Register an async callback for an event name
    ///
    /// Names are matched after stripping a leading `on_`, so `"message"` and
    /// `"on_message"` share a bucket.
    pub fn on<F, Fut>(&self, name: &str, f: F) -> ListenerId
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult> + Send + 'static,
    {
        self.dispatcher().registry().register(name, f)
    }

    /// Remove one callback; false if it was already gone
    pub fn unregister(&self, id: ListenerId) -> bool {
        self.dispatcher().registry().unregister(id)
    }

    /// Replace the default handler
    pub fn set_event_handler(&self, handler: impl EventHandler) {
        self.dispatcher().set_handler(Arc::new(handler));
    }

    #[inline]
    pub fn dispatcher(&self) -> &Dispatcher {
        self.inner.router.dispatcher()
    }

    // ========================================================================
    // Cache
    // ========================================================================

    /// Entities seen on the gateway or fetched through this client
    #[inline]
    pub fn cache(&self) -> &EntityStore {
        self.inner.router.store()
    }

    pub fn get_user(&self, id: Snowflake) -> Option<User> {
        self.cache().user(id)
    }

    pub fn get_guild(&self, id: Snowflake) -> Option<Guild> {
        self.cache().guild(id)
    }

    pub fn get_channel(&self, id: Snowflake) -> Option<Channel> {
        self.cache().channel(id)
    }

    pub fn get_member(&self, guild_id: Snowflake, user_id: Snowflake) -> Option<Member> {
        self.cache().member(guild_id, user_id)
    }

    pub fn get_role(&self, id: Snowflake) -> Option<Role> {
        self.cache().role(id)
    }

    pub fn get_message(&self, id: Snowflake) -> Option<Message> {
        self.cache().message(id)
    }

    pub fn guilds(&self) -> Vec<Guild> {
        self.cache().guilds()
    }

    // ========================================================================
    // REST
    // ========================================================================

    /// REST client for endpoints without a convenience method here
    #[inline]
    pub fn http(&self) -> &Arc<HttpClient> {
        &self.inner.http
    }

    /// Fetch a user and cache it
    pub async fn fetch_user(&self, id: Snowflake) -> ClientResult<User> {
        let user = self.inner.http.fetch_user(id).await?;
        Ok(self.cache().upsert_user(user))
    }

    /// Fetch a guild with its members and channels and cache it
    pub async fn fetch_guild(&self, id: Snowflake) -> ClientResult<Guild> {
        let guild = self.inner.http.fetch_guild(id, true, true).await?;
        Ok(self.cache().upsert_guild(guild))
    }

    pub async fn fetch_channel(&self, id: Snowflake) -> ClientResult<Channel> {
        let channel = self.inner.http.fetch_channel(id).await?;
        Ok(self.cache().upsert_channel(channel))
    }

    pub async fn fetch_member(&self, guild_id: Snowflake, user_id: Snowflake) -> ClientResult<Member> {
        let member = self.inner.http.fetch_member(guild_id, user_id).await?;
        Ok(self.cache().upsert_member(member))
    }

    pub async fn fetch_message(&self, id: Snowflake) -> ClientResult<Message> {
        let message = self.inner.http.fetch_message(id).await?;
        Ok(self.cache().upsert_message(message))
    }

    pub async fn send_message(&self, channel_id: Snowflake, content: &str) -> ClientResult<Message> {
        Ok(self.inner.http.send_message(channel_id, content).await?)
    }

    pub async fn edit_message(&self, id: Snowflake, content: &str) -> ClientResult<Message> {
        Ok(self.inner.http.edit_message(id, content).await?)
    }

    pub async fn delete_message(&self, id: Snowflake) -> ClientResult<()> {
        Ok(self.inner.http.delete_message(id).await?)
    }

    pub async fn create_guild(&self, name: &str) -> ClientResult<Guild> {
        Ok(self.inner.http.create_guild(name).await?)
    }

    pub async fn create_channel(&self, guild_id: Snowflake, name: &str) -> ClientResult<Channel> {
        Ok(self.inner.http.create_channel(guild_id, name).await?)
    }

    pub async fn create_role(
        &self,
        guild_id: Snowflake,
        name: &str,
        options: RoleOptions,
    ) -> ClientResult<Role> {
        Ok(self.inner.http.create_role(guild_id, name, options).await?)
    }

    pub async fn create_invite(
        &self,
        guild_id: Snowflake,
        max_age: Option<i64>,
        max_uses: Option<u32>,
    ) -> ClientResult<Invite> {
        Ok(self.inner.http.create_invite(guild_id, max_age, max_uses).await?)
    }

    /// Join a guild through an invite code
    pub async fn use_invite(&self, code: &str) -> ClientResult<Member> {
        let member = self.inner.http.use_invite(code).await?;
        Ok(self.cache().upsert_member(member))
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("state", &self.state())
            .field("running", &self.is_running())
            .field("http", &self.inner.http)
            .field("endpoint", &self.inner.endpoint.cached())
            .finish()
    }
}
