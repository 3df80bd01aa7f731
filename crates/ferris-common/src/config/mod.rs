//! Client configuration

mod client_config;

pub use client_config::{
    CacheConfig, ClientConfig, ConfigError, GatewayConfig, HttpConfig, ReconnectConfig,
    DEFAULT_API_BASE_URL,
};
