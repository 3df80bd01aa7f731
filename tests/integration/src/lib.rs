//! Integration test utilities for the Ferris client
//!
//! Provides an in-process REST server and gateway that tests script
//! response by response and frame by frame.

pub mod fixtures;
pub mod mock_gateway;
pub mod mock_rest;

pub use fixtures::*;
pub use mock_gateway::{GatewayConnection, MockGateway};
pub use mock_rest::{MockResponse, MockRestServer, RecordedRequest};

pub use axum::http::Method;

use std::time::Duration;

/// How long a helper waits for the client before failing the test
pub const STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Install the log subscriber once per test binary; `RUST_LOG` picks the level
pub fn init_test_tracing() {
    let _ = ferris_common::try_init_tracing();
}

/// Poll `condition` until it holds or [`STEP_TIMEOUT`] passes
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + STEP_TIMEOUT;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
