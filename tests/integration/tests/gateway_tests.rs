//! Client and gateway end to end
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ferris::{Client, ClientBuilder, ClientError, ClientResult};
use ferris_common::Credentials;
use ferris_core::Snowflake;
use ferris_gateway::{callback, ConnectionState, Event, GatewayError};
use integration_tests::{
    channel, eventually, guild_with, init_test_tracing, member, message, user, user_with_guild,
    Method, MockGateway, MockResponse, MockRestServer,
};
use parking_lot::Mutex;
use serde_json::json;
use tokio::task::JoinHandle;

struct Harness {
    rest: MockRestServer,
    gateway: MockGateway,
    client: Client,
    task: Option<JoinHandle<ClientResult<()>>>,
}

impl Harness {
    async fn new() -> Self {
        Self::with(|builder| builder).await
    }

    async fn with(configure: impl FnOnce(ClientBuilder) -> ClientBuilder) -> Self {
        Self::with_credentials(Credentials::token("test-token"), configure).await
    }

    async fn with_credentials(
        credentials: Credentials,
        configure: impl FnOnce(ClientBuilder) -> ClientBuilder,
    ) -> Self {
        init_test_tracing();
        let rest = MockRestServer::start().await.expect("Failed to start mock REST server");
        let gateway = MockGateway::start().await.expect("Failed to start mock gateway");
        rest.set_gateway_url(&gateway.url());

        let builder = ClientBuilder::new(credentials)
            .api_base_url(rest.base_url())
            .reconnect_backoff(Duration::from_millis(10), Duration::from_millis(50));
        let client = configure(builder).build().expect("Failed to build client");

        Self {
            rest,
            gateway,
            client,
            task: None,
        }
    }

    fn start(&mut self) {
        let client = self.client.clone();
        self.task = Some(tokio::spawn(async move { client.start().await }));
    }

    /// Wait for the control loop to return
    async fn finished(&mut self) -> ClientResult<()> {
        let task = self.task.take().expect("client was not started");
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("client did not stop")
            .expect("client task panicked")
    }
}

fn counter(client: &Client, name: &str) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let inner = Arc::clone(&count);
    client.on(name, move |_| {
        let inner = Arc::clone(&inner);
        async move {
            inner.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    });
    count
}

// ============================================================================
// Identify and ready
// ============================================================================

#[tokio::test]
async fn test_identify_resolves_ready_and_hydrates_cache() {
    let mut h = Harness::with(|b| b.intents(5)).await;
    let ready = counter(&h.client, "ready");
    h.start();

    let mut conn = h.gateway.accept().await.unwrap();
    let identify = conn.expect_identify().await.unwrap();
    assert_eq!(identify, json!({ "token": "test-token", "intents": 5 }));
    assert!(eventually(|| h.client.state() == ConnectionState::Identifying).await);

    let waiter = tokio::spawn({
        let client = h.client.clone();
        async move { client.wait_until_ready().await }
    });

    let guild = guild_with(
        10,
        42,
        "rustaceans",
        vec![channel(11, 10, "general")],
        vec![member(10, 42)],
    );
    conn.send_event("IdentifyAccepted", json!({ "user": user_with_guild(42, "ferris", guild) }))
        .await
        .unwrap();

    waiter.await.unwrap().unwrap();
    assert!(h.client.is_ready());
    assert_eq!(h.client.user().unwrap().id, Snowflake::new(42));
    assert_eq!(h.client.get_guild(Snowflake::new(10)).unwrap().name, "rustaceans");
    assert_eq!(h.client.get_channel(Snowflake::new(11)).unwrap().name, "general");
    assert!(h.client.get_member(Snowflake::new(10), Snowflake::new(42)).is_some());
    assert!(eventually(|| ready.load(Ordering::SeqCst) == 1).await);

    h.client.close().await;
    assert!(h.finished().await.is_ok());
}

#[tokio::test]
async fn test_state_is_connecting_during_endpoint_discovery() {
    let mut h = Harness::new().await;
    h.rest.enqueue(Method::GET, "/ws/info", [MockResponse::rate_limited(0.5)]);
    h.start();

    assert!(eventually(|| h.rest.request_count(&Method::GET, "/ws/info") == 1).await);
    assert_eq!(h.client.state(), ConnectionState::Connecting);

    let _conn = h.gateway.accept_identified(user(42, "ferris")).await.unwrap();
    h.client.wait_until_ready().await.unwrap();

    h.client.close().await;
    assert!(h.finished().await.is_ok());
}

#[tokio::test]
async fn test_reconnect_requires_a_new_identify_accepted() {
    let mut h = Harness::new().await;
    let ready = counter(&h.client, "ready");
    h.start();

    let conn = h.gateway.accept_identified(user(42, "ferris")).await.unwrap();
    h.client.wait_until_ready().await.unwrap();

    conn.close(1000, "bye").await.unwrap();
    let mut conn = h.gateway.accept().await.unwrap();
    conn.expect_identify().await.unwrap();
    assert!(!h.client.is_ready());

    let waiter = tokio::spawn({
        let client = h.client.clone();
        async move { client.wait_until_ready().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!waiter.is_finished());

    conn.send_event("IdentifyAccepted", json!({ "user": user(42, "ferris") }))
        .await
        .unwrap();
    waiter.await.unwrap().unwrap();

    assert!(eventually(|| ready.load(Ordering::SeqCst) == 2).await);
    // The URL is only looked up once while streams keep opening
    assert_eq!(h.rest.request_count(&Method::GET, "/ws/info"), 1);
    assert_eq!(h.gateway.connection_count(), 2);

    h.client.close().await;
    assert!(h.finished().await.is_ok());
}

#[tokio::test]
async fn test_login_token_is_used_for_identify() {
    let mut h = Harness::with_credentials(Credentials::email_password("crab@example.com", "hunter2"), |b| b).await;
    h.rest
        .respond(Method::POST, "/auth", MockResponse::ok(json!({ "token": "fresh-token" })));
    h.start();

    let mut conn = h.gateway.accept().await.unwrap();
    let identify = conn.expect_identify().await.unwrap();

    assert_eq!(identify["token"], "fresh-token");
    assert_eq!(h.rest.request_count(&Method::POST, "/auth"), 1);
    assert_eq!(h.client.http().token().unwrap().expose(), "fresh-token");

    h.client.close().await;
    assert!(h.finished().await.is_ok());
}

#[tokio::test]
async fn test_rejected_login_stops_the_client() {
    let mut h = Harness::with_credentials(Credentials::email_password("crab@example.com", "wrong"), |b| b).await;
    h.rest.respond(Method::POST, "/auth", MockResponse::empty(401));
    h.start();

    let result = h.finished().await;
    assert!(matches!(result, Err(ClientError::Http(_))));
    assert_eq!(h.gateway.connection_count(), 0);
}

// ============================================================================
// Liveness
// ============================================================================

#[tokio::test]
async fn test_ping_gets_exactly_one_pong() {
    let mut h = Harness::new().await;
    h.start();
    let mut conn = h.gateway.accept_identified(user(42, "ferris")).await.unwrap();
    h.client.wait_until_ready().await.unwrap();

    conn.send_bare("Ping").await.unwrap();
    let reply = conn.recv().await.unwrap().unwrap();
    assert_eq!(reply, json!({ "c": "Pong" }));
    assert!(conn.recv_within(Duration::from_millis(200)).await.is_err());

    h.client.close().await;
    assert!(h.finished().await.is_ok());
}

#[tokio::test]
async fn test_pong_records_latency() {
    let mut h = Harness::with(|b| b.heartbeat_interval(Duration::from_millis(50))).await;
    h.start();
    let mut conn = h.gateway.accept_identified(user(42, "ferris")).await.unwrap();

    conn.recv_named("Ping").await.unwrap();
    conn.send_bare("Pong").await.unwrap();

    assert!(eventually(|| h.client.latency().is_some()).await);

    h.client.close().await;
    assert!(h.finished().await.is_ok());
}

#[tokio::test]
async fn test_silent_gateway_is_dropped_and_reconnected() {
    let mut h = Harness::with(|b| {
        b.heartbeat_interval(Duration::from_millis(50))
            .max_heartbeat_timeout(Duration::from_millis(200))
    })
    .await;
    h.start();

    // Accept, then withhold every frame
    let mut conn = h.gateway.accept_identified(user(42, "ferris")).await.unwrap();
    let code = conn.closed_by_client().await.unwrap();
    assert_eq!(code, Some(4009));

    let mut conn = h.gateway.accept().await.unwrap();
    conn.expect_identify().await.unwrap();
    assert_eq!(h.gateway.connection_count(), 2);

    h.client.close().await;
    assert!(h.finished().await.is_ok());
}

// ============================================================================
// Reconnect
// ============================================================================

#[tokio::test]
async fn test_frames_before_close_are_applied_before_reconnect() {
    let mut h = Harness::new().await;
    h.start();
    let mut conn = h.gateway.accept_identified(user(42, "ferris")).await.unwrap();

    for id in 1..=5 {
        conn.send_event(
            "MessageCreate",
            json!({ "message": message(id, 11, 42, &format!("msg {id}")) }),
        )
        .await
        .unwrap();
    }
    conn.close(1001, "restarting").await.unwrap();

    let _next = h.gateway.accept().await.unwrap();
    let ids: Vec<Snowflake> = h.client.cache().messages().iter().map(|m| m.id).collect();
    assert_eq!(ids, (1..=5u64).map(Snowflake::from).collect::<Vec<_>>());

    h.client.close().await;
    assert!(h.finished().await.is_ok());
}

#[tokio::test]
async fn test_authentication_failure_is_terminal() {
    let mut h = Harness::new().await;
    h.start();
    let mut conn = h.gateway.accept().await.unwrap();
    conn.expect_identify().await.unwrap();

    conn.close(4004, "invalid token").await.unwrap();

    let result = h.finished().await;
    assert!(matches!(
        result,
        Err(ClientError::Gateway(GatewayError::Closed { code: Some(4004), .. }))
    ));
    assert_eq!(h.gateway.connection_count(), 1);
    assert_eq!(h.client.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_failed_connect_refreshes_gateway_url() {
    let mut h = Harness::new().await;

    // A port nothing listens on
    let dead = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_url = format!("ws://{}", dead.local_addr().unwrap());
    drop(dead);
    h.rest.enqueue(
        Method::GET,
        "/ws/info",
        [MockResponse::ok(json!({ "url": dead_url }))],
    );
    h.start();

    let mut conn = h.gateway.accept().await.unwrap();
    conn.expect_identify().await.unwrap();
    assert_eq!(h.rest.request_count(&Method::GET, "/ws/info"), 2);

    h.client.close().await;
    assert!(h.finished().await.is_ok());
}

// ============================================================================
// Routing and dispatch
// ============================================================================

#[tokio::test]
async fn test_uncached_message_delete_dispatches_payload_copy() {
    let mut h = Harness::new().await;
    let deleted = Arc::new(Mutex::new(Vec::new()));
    h.client.on("message_delete", {
        let deleted = Arc::clone(&deleted);
        move |event| {
            let deleted = Arc::clone(&deleted);
            async move {
                if let Event::MessageDelete(message) = event {
                    deleted.lock().push((message.id, message.content));
                }
                Ok(())
            }
        }
    });
    h.start();
    let mut conn = h.gateway.accept_identified(user(42, "ferris")).await.unwrap();

    conn.send_event(
        "MessageDelete",
        json!({ "message": message(77, 11, 42, "gone") }),
    )
    .await
    .unwrap();

    assert!(eventually(|| deleted.lock().len() == 1).await);
    assert_eq!(deleted.lock()[0], (Snowflake::new(77), "gone".to_string()));
    assert!(h.client.get_message(Snowflake::new(77)).is_none());

    h.client.close().await;
    assert!(h.finished().await.is_ok());
}

#[tokio::test]
async fn test_prefixed_registration_shares_bucket_and_order() {
    let mut h = Harness::new().await;
    let order = Arc::new(Mutex::new(Vec::new()));

    let make = |tag: &'static str| {
        let order = Arc::clone(&order);
        callback(move |_| {
            let order = Arc::clone(&order);
            async move {
                order.lock().push(tag);
                Ok(())
            }
        })
    };
    let first = make("first");
    let second = make("second");

    let registry = h.client.dispatcher().registry();
    let a = registry.register_callback("message", Arc::clone(&first));
    let b = registry.register_callback("message", second);
    let again = registry.register_callback("on_message", first);
    assert_eq!(a, again);
    assert_ne!(a, b);
    assert_eq!(registry.count("message"), 2);

    h.start();
    let mut conn = h.gateway.accept_identified(user(42, "ferris")).await.unwrap();
    conn.send_event("MessageCreate", json!({ "message": message(1, 11, 42, "hi") }))
        .await
        .unwrap();

    assert!(eventually(|| order.lock().len() == 2).await);
    assert_eq!(*order.lock(), vec!["first", "second"]);

    h.client.close().await;
    assert!(h.finished().await.is_ok());
}

#[tokio::test]
async fn test_failing_callback_becomes_error_event() {
    let mut h = Harness::new().await;
    h.client.on("message", |_| async { Err("handler exploded".into()) });
    let after = counter(&h.client, "message");
    let errors = Arc::new(Mutex::new(Vec::new()));
    h.client.on("on_error", {
        let errors = Arc::clone(&errors);
        move |event| {
            let errors = Arc::clone(&errors);
            async move {
                if let Event::Error(e) = event {
                    errors.lock().push(e);
                }
                Ok(())
            }
        }
    });
    h.start();
    let mut conn = h.gateway.accept_identified(user(42, "ferris")).await.unwrap();

    conn.send_event("MessageCreate", json!({ "message": message(1, 11, 42, "hi") }))
        .await
        .unwrap();

    assert!(eventually(|| errors.lock().len() == 1).await);
    assert_eq!(errors.lock()[0].event, "message");
    assert!(errors.lock()[0].message.contains("handler exploded"));
    assert!(eventually(|| after.load(Ordering::SeqCst) == 1).await);

    h.client.close().await;
    assert!(h.finished().await.is_ok());
}

#[tokio::test]
async fn test_bad_frames_are_dropped_without_disconnecting() {
    let mut h = Harness::new().await;
    let messages = counter(&h.client, "message");
    h.start();
    let mut conn = h.gateway.accept_identified(user(42, "ferris")).await.unwrap();

    conn.send_raw("not json").await.unwrap();
    conn.send_event("SomethingNew", json!({})).await.unwrap();
    conn.send_event("MessageCreate", json!({ "message": "wrong shape" }))
        .await
        .unwrap();
    conn.send_event("MessageCreate", json!({ "message": message(2, 11, 42, "ok") }))
        .await
        .unwrap();

    assert!(eventually(|| messages.load(Ordering::SeqCst) == 1).await);
    assert_eq!(h.gateway.connection_count(), 1);
    assert!(h.client.is_ready());

    h.client.close().await;
    assert!(h.finished().await.is_ok());
}

#[tokio::test]
async fn test_unanswered_typing_start_ends_on_its_own() {
    let mut h = Harness::with(|b| b.typing_timeout(Duration::from_millis(100))).await;
    let ended = counter(&h.client, "typing_end");
    h.start();
    let mut conn = h.gateway.accept_identified(user(42, "ferris")).await.unwrap();

    conn.send_event("TypingStart", json!({ "channel_id": "11", "user_id": "42" }))
        .await
        .unwrap();

    assert!(eventually(|| ended.load(Ordering::SeqCst) == 1).await);

    h.client.close().await;
    assert!(h.finished().await.is_ok());
}

// ============================================================================
// Close
// ============================================================================

#[tokio::test]
async fn test_close_is_idempotent_and_sends_normal_closure() {
    let mut h = Harness::new().await;
    h.start();
    let mut conn = h.gateway.accept_identified(user(42, "ferris")).await.unwrap();
    h.client.wait_until_ready().await.unwrap();

    h.client.close().await;
    h.client.close().await;

    assert_eq!(conn.closed_by_client().await.unwrap(), Some(1000));
    assert!(h.finished().await.is_ok());
    assert_eq!(h.client.state(), ConnectionState::Closed);
    assert!(matches!(h.client.wait_until_ready().await, Err(ClientError::Closed)));
    assert!(matches!(h.client.start().await, Err(ClientError::Closed)));
    assert_eq!(h.gateway.connection_count(), 1);
}

#[tokio::test]
async fn test_close_during_backoff_stays_closed() {
    let mut h = Harness::with(|b| b.reconnect_backoff(Duration::from_secs(30), Duration::from_secs(30))).await;
    h.start();
    let conn = h.gateway.accept_identified(user(42, "ferris")).await.unwrap();
    h.client.wait_until_ready().await.unwrap();

    conn.close(1000, "bye").await.unwrap();
    assert!(eventually(|| h.client.state() == ConnectionState::Reconnecting).await);

    h.client.close().await;
    assert!(h.finished().await.is_ok());
    assert_eq!(h.gateway.connection_count(), 1);
}
