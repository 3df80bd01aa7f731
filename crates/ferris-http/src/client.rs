//! HTTP client
//!
//! Every request passes through the route's rate-limit bucket, then the
//! response status decides between returning, retrying and failing:
//!
//! - 2xx: decoded JSON (an empty body decodes to `null`)
//! - 429: throttle the bucket for `retry_after` seconds and retry, unbounded
//! - 5xx: retry up to [`MAX_ATTEMPTS`] attempts in total
//! - 400/401/403/404 and anything else: fail immediately

use std::time::Duration;

use parking_lot::RwLock;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use ferris_common::{HttpConfig, Token};

use crate::error::{HttpError, HttpResult};
use crate::ratelimit::BucketMap;
use crate::route::Route;

/// Total attempts for a request answered with 5xx
pub const MAX_ATTEMPTS: u32 = 3;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!(
    "FerrisWheel (https://github.com/Cryptex-github/ferriswheel v",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Authenticated REST client
///
/// Cheap to share behind an `Arc`; all state is internally synchronized.
pub struct HttpClient {
    client: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<Token>>,
    buckets: BucketMap,
}

impl HttpClient {
    /// Create a client for the configured base URL
    pub fn new(config: &HttpConfig, token: Option<Token>) -> HttpResult<Self> {
        let base_url = Url::parse(&config.api_base_url)
            .map_err(|e| HttpError::InvalidUrl(format!("{}: {e}", config.api_base_url)))?;

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: RwLock::new(token),
            buckets: BucketMap::new(),
        })
    }

    /// Base URL all routes are resolved against
    #[inline]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Replace the session token
    pub fn set_token(&self, token: Token) {
        *self.token.write() = Some(token);
    }

    /// Current session token
    pub fn token(&self) -> Option<Token> {
        self.token.read().clone()
    }

    /// Rate-limit buckets used by this client
    #[inline]
    pub fn buckets(&self) -> &BucketMap {
        &self.buckets
    }

    /// Issue an authenticated request and return the decoded body
    pub async fn request(&self, route: Route, body: Option<Value>) -> HttpResult<Value> {
        self.execute(&route, body.as_ref(), true).await
    }

    /// Issue an authenticated request and deserialize the body
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        route: Route,
        body: Option<Value>,
    ) -> HttpResult<T> {
        let value = self.request(route, body).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Issue a request without the session token
    pub(crate) async fn request_anonymous(
        &self,
        route: Route,
        body: Option<Value>,
    ) -> HttpResult<Value> {
        self.execute(&route, body.as_ref(), false).await
    }

    async fn execute(&self, route: &Route, body: Option<&Value>, authorize: bool) -> HttpResult<Value> {
        let url = route.url(&self.base_url)?;
        let key = route.bucket_key();
        let bucket = self.buckets.get(&key);
        let mut attempt = 0;

        loop {
            if !bucket.is_open() {
                tracing::debug!(bucket = %key, "Waiting for rate limit bucket");
            }
            bucket.wait_open().await;

            let response = self.send(route, &url, body, authorize).await?;
            let status = response.status();
            let text = response.text().await?;

            tracing::trace!(route = %route, status = status.as_u16(), "Response received");

            match status {
                s if s.is_success() => return decode_body(&text),
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = parse_retry_after(&text);
                    tracing::warn!(
                        bucket = %key,
                        retry_after_ms = retry_after.as_millis() as u64,
                        "Rate limited"
                    );
                    bucket.throttle(retry_after).await;
                }
                StatusCode::BAD_REQUEST => return Err(HttpError::bad_request(&text)),
                StatusCode::UNAUTHORIZED => return Err(HttpError::Unauthorized(text)),
                StatusCode::FORBIDDEN => return Err(HttpError::Forbidden(text)),
                StatusCode::NOT_FOUND => return Err(HttpError::NotFound(text)),
                s if s.is_server_error() => {
                    attempt += 1;
                    if attempt >= MAX_ATTEMPTS {
                        tracing::warn!(
                            route = %route,
                            status = s.as_u16(),
                            attempts = attempt,
                            "Giving up after server errors"
                        );
                        return Err(HttpError::server(s.as_u16(), &text));
                    }
                    tracing::debug!(route = %route, status = s.as_u16(), attempt, "Retrying after server error");
                }
                s => {
                    return Err(HttpError::Status {
                        status: s.as_u16(),
                        body: text,
                    })
                }
            }
        }
    }

    async fn send(
        &self,
        route: &Route,
        url: &Url,
        body: Option<&Value>,
        authorize: bool,
    ) -> HttpResult<Response> {
        let mut request = self.client.request(route.method().clone(), url.clone());

        let token = if authorize { self.token() } else { None };
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(token.expose()).map_err(|_| {
                HttpError::Unauthorized("token contains invalid header characters".to_string())
            })?;
            value.set_sensitive(true);
            request = request.header(AUTHORIZATION, value);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &*self.token.read())
            .field("buckets", &self.buckets.len())
            .finish()
    }
}

/// Decode a success body; an empty body is `null`
fn decode_body(text: &str) -> HttpResult<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(text)?)
}

/// `retry_after` (seconds, possibly fractional) from a 429 body
fn parse_retry_after(text: &str) -> Duration {
    #[derive(Deserialize)]
    struct Payload {
        #[serde(default)]
        retry_after: f64,
    }

    serde_json::from_str::<Payload>(text)
        .ok()
        .and_then(|p| Duration::try_from_secs_f64(p.retry_after).ok())
        .unwrap_or(Duration::ZERO)
}
