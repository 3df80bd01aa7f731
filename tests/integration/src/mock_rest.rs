//! Scripted REST server
//!
//! Every route answers from a queue of scripted responses, then from its
//! fallback response, then with 404. All requests are recorded.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// One scripted answer
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: StatusCode,
    pub body: Option<Value>,
}

impl MockResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: Some(body),
        }
    }

    pub fn ok(body: Value) -> Self {
        Self::json(200, body)
    }

    /// Status with an empty body
    pub fn empty(status: u16) -> Self {
        Self {
            body: None,
            ..Self::json(status, Value::Null)
        }
    }

    /// 429 carrying `retry_after` in seconds
    pub fn rate_limited(retry_after: f64) -> Self {
        Self::json(429, json!({ "retry_after": retry_after }))
    }
}

/// A request as the server saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub user_agent: Option<String>,
    pub body: Option<Value>,
    pub received_at: Instant,
}

#[derive(Default)]
struct Script {
    queue: VecDeque<MockResponse>,
    fallback: Option<MockResponse>,
}

#[derive(Default)]
struct MockState {
    scripts: Mutex<HashMap<String, Script>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockState {
    fn next_response(&self, key: &str) -> MockResponse {
        let mut scripts = self.scripts.lock();
        let Some(script) = scripts.get_mut(key) else {
            return MockResponse::json(404, json!({ "reason": format!("no mock for {key}") }));
        };
        script
            .queue
            .pop_front()
            .or_else(|| script.fallback.clone())
            .unwrap_or_else(|| MockResponse::json(404, json!({ "reason": "script exhausted" })))
    }
}

fn route_key(method: &Method, path: &str) -> String {
    format!("{method} {path}")
}

/// In-process REST server
pub struct MockRestServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockRestServer {
    /// Bind to an ephemeral port and start serving
    pub async fn start() -> Result<Self> {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .fallback(handle_request)
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::warn!(error = %e, "Mock REST server stopped");
            }
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Answer every request to a route with `response`
    pub fn respond(&self, method: Method, path: &str, response: MockResponse) -> &Self {
        self.state
            .scripts
            .lock()
            .entry(route_key(&method, path))
            .or_default()
            .fallback = Some(response);
        self
    }

    /// Answer the next requests to a route with `responses`, in order
    pub fn enqueue(
        &self,
        method: Method,
        path: &str,
        responses: impl IntoIterator<Item = MockResponse>,
    ) -> &Self {
        self.state
            .scripts
            .lock()
            .entry(route_key(&method, path))
            .or_default()
            .queue
            .extend(responses);
        self
    }

    /// Point gateway discovery at `url`
    pub fn set_gateway_url(&self, url: &str) -> &Self {
        self.respond(Method::GET, "/ws/info", MockResponse::ok(json!({ "url": url })))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    pub fn requests_to(&self, method: &Method, path: &str) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .iter()
            .filter(|r| &r.method == method && r.path == path)
            .cloned()
            .collect()
    }

    pub fn request_count(&self, method: &Method, path: &str) -> usize {
        self.requests_to(method, path).len()
    }
}

impl Drop for MockRestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_request(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let key = route_key(&method, uri.path());
    state.requests.lock().push(RecordedRequest {
        method,
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: header_text(header::AUTHORIZATION),
        user_agent: header_text(header::USER_AGENT),
        body: serde_json::from_slice(&body).ok(),
        received_at: Instant::now(),
    });

    let response = state.next_response(&key);

    match response.body {
        Some(body) => (response.status, Json(body)).into_response(),
        None => response.status.into_response(),
    }
}
