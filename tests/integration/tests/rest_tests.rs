//! REST layer against the scripted server
//!
//! Run with: cargo test -p integration-tests --test rest_tests

use std::sync::Arc;
use std::time::Duration;

use ferris_common::{HttpConfig, Token};
use ferris_core::Snowflake;
use ferris_http::{HttpClient, HttpError, RoleOptions, USER_AGENT};
use integration_tests::{channel, fixtures, init_test_tracing, Method, MockResponse, MockRestServer};
use serde_json::json;

async fn setup() -> (MockRestServer, Arc<HttpClient>) {
    init_test_tracing();
    let server = MockRestServer::start().await.expect("Failed to start mock server");
    let config = HttpConfig {
        api_base_url: server.base_url(),
        verify_tls: true,
    };
    let http = HttpClient::new(&config, Some(Token::new("test-token"))).expect("Failed to build client");
    (server, Arc::new(http))
}

// ============================================================================
// Rate limiting
// ============================================================================

#[tokio::test]
async fn test_429_retried_until_success() {
    let (server, http) = setup().await;
    server.enqueue(
        Method::GET,
        "/channels/1",
        [
            MockResponse::rate_limited(0.05),
            MockResponse::rate_limited(0.1),
            MockResponse::ok(channel(1, 9, "general")),
        ],
    );

    let fetched = http.fetch_channel(Snowflake::new(1)).await.unwrap();

    assert_eq!(fetched.name, "general");
    assert_eq!(server.request_count(&Method::GET, "/channels/1"), 3);
}

#[tokio::test]
async fn test_closed_bucket_holds_other_requests_on_same_route() {
    let (server, http) = setup().await;
    server.enqueue(
        Method::GET,
        "/channels/1",
        [MockResponse::rate_limited(0.3), MockResponse::ok(channel(1, 9, "a"))],
    );
    server.respond(Method::GET, "/channels/2", MockResponse::ok(channel(2, 9, "b")));

    let first = tokio::spawn({
        let http = Arc::clone(&http);
        async move { http.fetch_channel(Snowflake::new(1)).await }
    });

    // Let the first request hit the 429 and close the gate
    while server.request_count(&Method::GET, "/channels/1") == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    tokio::time::sleep(Duration::from_millis(30)).await;

    let second = http.fetch_channel(Snowflake::new(2)).await.unwrap();
    assert_eq!(second.name, "b");
    assert_eq!(first.await.unwrap().unwrap().name, "a");

    let throttled_at = server.requests_to(&Method::GET, "/channels/1")[0].received_at;
    let held = server.requests_to(&Method::GET, "/channels/2")[0].received_at;
    assert!(held.duration_since(throttled_at) >= Duration::from_millis(250));
}

#[tokio::test]
async fn test_throttle_does_not_block_other_routes() {
    let (server, http) = setup().await;
    server.enqueue(
        Method::GET,
        "/channels/1",
        [MockResponse::rate_limited(0.5), MockResponse::ok(channel(1, 9, "a"))],
    );
    server.respond(Method::GET, "/users/5", MockResponse::ok(fixtures::user(5, "crab")));

    let throttled = tokio::spawn({
        let http = Arc::clone(&http);
        async move { http.fetch_channel(Snowflake::new(1)).await }
    });
    while server.request_count(&Method::GET, "/channels/1") == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let started = std::time::Instant::now();
    let user = http.fetch_user(Snowflake::new(5)).await.unwrap();
    assert_eq!(user.name, "crab");
    assert!(started.elapsed() < Duration::from_millis(400));

    throttled.await.unwrap().unwrap();
}

// ============================================================================
// Server errors
// ============================================================================

#[tokio::test]
async fn test_5xx_gives_up_after_three_attempts() {
    let (server, http) = setup().await;
    server.respond(
        Method::GET,
        "/users/1",
        MockResponse::json(500, json!({ "reason": "boom" })),
    );

    let err = http.fetch_user(Snowflake::new(1)).await.unwrap_err();

    assert!(matches!(err, HttpError::ServerError { status: 500, ref reason } if reason == "boom"));
    assert_eq!(server.request_count(&Method::GET, "/users/1"), 3);
}

#[tokio::test]
async fn test_503_maps_to_service_unavailable() {
    let (server, http) = setup().await;
    server.respond(Method::GET, "/users/1", MockResponse::empty(503));

    let err = http.fetch_user(Snowflake::new(1)).await.unwrap_err();

    assert!(matches!(err, HttpError::ServiceUnavailable { .. }));
    assert!(err.is_retryable());
    assert_eq!(server.request_count(&Method::GET, "/users/1"), 3);
}

#[tokio::test]
async fn test_success_on_second_attempt_stops_retrying() {
    let (server, http) = setup().await;
    server.enqueue(
        Method::GET,
        "/users/1",
        [MockResponse::empty(502), MockResponse::ok(fixtures::user(1, "ferris"))],
    );

    let user = http.fetch_user(Snowflake::new(1)).await.unwrap();

    assert_eq!(user.name, "ferris");
    assert_eq!(server.request_count(&Method::GET, "/users/1"), 2);
}

// ============================================================================
// Terminal errors
// ============================================================================

#[tokio::test]
async fn test_400_surfaces_reason_and_location() {
    let (server, http) = setup().await;
    server.respond(
        Method::POST,
        "/guilds",
        MockResponse::json(
            400,
            json!({ "reason": "name too long", "location": { "line": 1, "character": 9 } }),
        ),
    );

    let err = http.create_guild("x").await.unwrap_err();

    match err {
        HttpError::BadRequest { reason, location } => {
            assert_eq!(reason, "name too long");
            let location = location.unwrap();
            assert_eq!((location.line, location.character), (1, 9));
        }
        other => panic!("expected BadRequest, got {other:?}"),
    }
    assert_eq!(server.request_count(&Method::POST, "/guilds"), 1);
}

#[tokio::test]
async fn test_terminal_statuses_are_not_retried() {
    let (server, http) = setup().await;
    server.respond(Method::GET, "/users/1", MockResponse::empty(401));
    server.respond(Method::GET, "/users/2", MockResponse::empty(403));
    server.respond(Method::GET, "/users/3", MockResponse::empty(404));
    server.respond(Method::GET, "/users/4", MockResponse::empty(418));

    let unauthorized = http.fetch_user(Snowflake::new(1)).await.unwrap_err();
    let forbidden = http.fetch_user(Snowflake::new(2)).await.unwrap_err();
    let not_found = http.fetch_user(Snowflake::new(3)).await.unwrap_err();
    let teapot = http.fetch_user(Snowflake::new(4)).await.unwrap_err();

    assert!(matches!(unauthorized, HttpError::Unauthorized(_)));
    assert!(matches!(forbidden, HttpError::Forbidden(_)));
    assert!(matches!(not_found, HttpError::NotFound(_)));
    assert!(matches!(teapot, HttpError::Status { status: 418, .. }));
    assert_eq!(server.requests().len(), 4);
}

// ============================================================================
// Requests on the wire
// ============================================================================

#[tokio::test]
async fn test_requests_carry_token_and_user_agent() {
    let (server, http) = setup().await;
    server.respond(Method::GET, "/users/7", MockResponse::ok(fixtures::user(7, "crab")));

    http.fetch_user(Snowflake::new(7)).await.unwrap();

    let request = &server.requests_to(&Method::GET, "/users/7")[0];
    assert_eq!(request.authorization.as_deref(), Some("test-token"));
    assert_eq!(request.user_agent.as_deref(), Some(USER_AGENT));
}

#[tokio::test]
async fn test_login_exchanges_credentials_without_token() {
    let (server, http) = setup().await;
    server.respond(Method::POST, "/auth", MockResponse::ok(json!({ "token": "fresh-token" })));

    let token = http.login("crab@example.com", "hunter2").await.unwrap();

    assert_eq!(token.expose(), "fresh-token");
    let request = &server.requests_to(&Method::POST, "/auth")[0];
    assert!(request.authorization.is_none());
    assert_eq!(
        request.body,
        Some(json!({ "email": "crab@example.com", "password": "hunter2" }))
    );
}

#[tokio::test]
async fn test_fetch_guild_sends_flags_as_query() {
    let (server, http) = setup().await;
    server.respond(
        Method::GET,
        "/guilds/3",
        MockResponse::ok(fixtures::guild(3, 1, "rustaceans")),
    );

    let guild = http.fetch_guild(Snowflake::new(3), true, false).await.unwrap();

    assert_eq!(guild.name, "rustaceans");
    let request = &server.requests_to(&Method::GET, "/guilds/3")[0];
    assert_eq!(request.query.as_deref(), Some("members=true&channels=false"));
}

#[tokio::test]
async fn test_role_edit_sends_only_set_fields() {
    let (server, http) = setup().await;
    server.respond(
        Method::PATCH,
        "/guilds/3/roles/4",
        MockResponse::ok(fixtures::role(4, 3, "mods")),
    );

    let options = RoleOptions {
        color: Some(0x00FF00),
        ..RoleOptions::default()
    };
    http.edit_role(Snowflake::new(3), Snowflake::new(4), None, options)
        .await
        .unwrap();

    let request = &server.requests_to(&Method::PATCH, "/guilds/3/roles/4")[0];
    assert_eq!(request.body, Some(json!({ "color": 0x00FF00 })));
}

#[tokio::test]
async fn test_empty_success_body_is_accepted() {
    let (server, http) = setup().await;
    server.respond(Method::DELETE, "/messages/8", MockResponse::empty(204));

    http.delete_message(Snowflake::new(8)).await.unwrap();
    assert_eq!(server.request_count(&Method::DELETE, "/messages/8"), 1);
}
