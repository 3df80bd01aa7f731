//! Ping / Pong handler

use super::{EventRouter, HandlerResult, SessionContext};
use crate::protocol::GatewayFrame;

/// Handles `Ping` and `Pong`
pub struct HeartbeatHandler;

impl HeartbeatHandler {
    /// Answer a ping from the peer
    ///
    /// The pong is queued before the next frame is read.
    pub fn ping(ctx: &SessionContext) -> HandlerResult<()> {
        ctx.writer.send(GatewayFrame::pong())?;
        tracing::trace!("Pong queued");
        Ok(())
    }

    /// Record the round trip of our last ping
    pub fn pong(router: &EventRouter, ctx: &SessionContext) -> HandlerResult<()> {
        match ctx.liveness.record_pong() {
            Some(latency) => {
                tracing::trace!(latency_ms = latency.as_millis() as u64, "Pong received");
                router.set_latency(latency);
            }
            None => tracing::debug!("Pong without an outstanding ping"),
        }
        Ok(())
    }
}
