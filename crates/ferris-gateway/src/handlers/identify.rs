//! IdentifyAccepted handler

use super::{EventRouter, HandlerResult};
use crate::events::Event;
use crate::protocol::IdentifyAcceptedPayload;

/// Handles `IdentifyAccepted`
pub struct IdentifyHandler;

impl IdentifyHandler {
    /// Cache the accepted user and its guilds, then resolve the ready signal
    ///
    /// `ready` is dispatched once per session; a repeated accept only
    /// re-dispatches `identify_accepted`.
    pub fn handle(router: &EventRouter, payload: IdentifyAcceptedPayload) -> HandlerResult<()> {
        let user = router.store().upsert_user(payload.user);
        router.set_current_user(user.id);

        tracing::info!(
            user_id = %user.id,
            guilds = user.guild_ids.len(),
            "Identify accepted"
        );

        router.dispatcher().dispatch(Event::IdentifyAccepted(user));

        if router.status().mark_ready() {
            tracing::info!("Gateway session ready");
            router.dispatcher().dispatch(Event::Ready);
        }
        Ok(())
    }
}
