//! Invite handlers

use super::{EventRouter, HandlerResult};
use crate::events::Event;
use crate::protocol::InvitePayload;

/// Handles `InviteCreate` / `InviteDelete`
pub struct InviteHandler;

impl InviteHandler {
    pub fn create(router: &EventRouter, payload: InvitePayload) -> HandlerResult<()> {
        let invite = router.store().upsert_invite(payload.invite);
        router.dispatcher().dispatch(Event::InviteCreate(invite));
        Ok(())
    }

    pub fn delete(router: &EventRouter, payload: InvitePayload) -> HandlerResult<()> {
        let invite = router
            .store()
            .remove_invite(&payload.invite.code)
            .unwrap_or(payload.invite);
        router.dispatcher().dispatch(Event::InviteDelete(invite));
        Ok(())
    }
}
