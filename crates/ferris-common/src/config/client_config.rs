//! Client configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when
//! present). Every section has defaults; only credentials are required.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::auth::{Credentials, Token};

/// Default REST base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.ferris.chat/v0";

/// Main client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub credentials: Credentials,
    pub http: HttpConfig,
    pub gateway: GatewayConfig,
    pub cache: CacheConfig,
}

/// REST layer settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub api_base_url: String,
    /// Verify TLS certificates (REST and gateway)
    pub verify_tls: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            verify_tls: default_verify_tls(),
        }
    }
}

/// Gateway session settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Interval between liveness cycles
    pub heartbeat_interval: Duration,
    /// Silence after which the peer is treated as dead
    pub max_heartbeat_timeout: Duration,
    /// Delay before a typing indicator expires on its own
    pub typing_timeout: Duration,
    /// Capability bits sent with identify
    pub intents: u64,
    pub reconnect: ReconnectConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: default_heartbeat_interval(),
            max_heartbeat_timeout: default_max_heartbeat_timeout(),
            typing_timeout: default_typing_timeout(),
            intents: 0,
            reconnect: ReconnectConfig::default(),
        }
    }
}

/// Reconnect backoff settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectConfig {
    pub base: Duration,
    pub max: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base: default_reconnect_base(),
            max: default_reconnect_max(),
        }
    }
}

/// Entity cache settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Capacity of the message buffer
    pub max_messages: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_messages: default_max_messages(),
        }
    }
}

// Default value functions
fn default_verify_tls() -> bool {
    true
}

fn default_max_messages() -> usize {
    1000
}

fn default_heartbeat_interval() -> Duration {
    Duration::from_secs(45)
}

fn default_max_heartbeat_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_typing_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_reconnect_base() -> Duration {
    Duration::from_millis(1000)
}

fn default_reconnect_max() -> Duration {
    Duration::from_millis(30_000)
}

impl ClientConfig {
    /// Configuration with default settings for the given credentials
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            http: HttpConfig::default(),
            gateway: GatewayConfig::default(),
            cache: CacheConfig::default(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if credentials are missing or ambiguous, or a value
    /// cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let credentials = match (
            var("FERRIS_TOKEN"),
            var("FERRIS_EMAIL"),
            var("FERRIS_PASSWORD"),
        ) {
            (Some(token), None, None) => Credentials::Token(Token::new(token)),
            (None, Some(email), Some(password)) => Credentials::EmailPassword { email, password },
            (None, Some(_), None) => return Err(ConfigError::MissingVar("FERRIS_PASSWORD")),
            (None, None, Some(_)) => return Err(ConfigError::MissingVar("FERRIS_EMAIL")),
            (None, None, None) => return Err(ConfigError::MissingVar("FERRIS_TOKEN")),
            (Some(_), _, _) => return Err(ConfigError::ConflictingCredentials),
        };

        Ok(Self {
            credentials,
            http: HttpConfig {
                api_base_url: var("FERRIS_API_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
                verify_tls: match var("FERRIS_VERIFY_TLS") {
                    Some(raw) => parse_bool("FERRIS_VERIFY_TLS", &raw)?,
                    None => default_verify_tls(),
                },
            },
            gateway: GatewayConfig {
                heartbeat_interval: parse_or(&var, "FERRIS_HEARTBEAT_INTERVAL_SECS")?
                    .map_or_else(default_heartbeat_interval, Duration::from_secs),
                max_heartbeat_timeout: parse_or(&var, "FERRIS_MAX_HEARTBEAT_TIMEOUT_SECS")?
                    .map_or_else(default_max_heartbeat_timeout, Duration::from_secs),
                typing_timeout: parse_or(&var, "FERRIS_TYPING_TIMEOUT_SECS")?
                    .map_or_else(default_typing_timeout, Duration::from_secs),
                intents: parse_or(&var, "FERRIS_INTENTS")?.unwrap_or(0),
                reconnect: ReconnectConfig {
                    base: parse_or(&var, "FERRIS_RECONNECT_BASE_MS")?
                        .map_or_else(default_reconnect_base, Duration::from_millis),
                    max: parse_or(&var, "FERRIS_RECONNECT_MAX_MS")?
                        .map_or_else(default_reconnect_max, Duration::from_millis),
                },
            },
            cache: CacheConfig {
                max_messages: parse_or(&var, "FERRIS_MAX_MESSAGES")?
                    .unwrap_or_else(default_max_messages),
            },
        })
    }
}

fn parse_or<T, F>(var: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    var(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidValue(name, raw))
        })
        .transpose()
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue(name, raw.to_string())),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),

    #[error("FERRIS_TOKEN cannot be combined with FERRIS_EMAIL/FERRIS_PASSWORD")]
    ConflictingCredentials,
}
