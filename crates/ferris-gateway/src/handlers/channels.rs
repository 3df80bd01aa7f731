//! Channel handlers

use super::{EventRouter, HandlerResult};
use crate::events::Event;
use crate::protocol::{ChannelPayload, UpdatePayload};
use ferris_core::Channel;

/// Handles `ChannelCreate` / `ChannelUpdate` / `ChannelDelete`
pub struct ChannelHandler;

impl ChannelHandler {
    pub fn create(router: &EventRouter, payload: ChannelPayload) -> HandlerResult<()> {
        let channel = router.store().upsert_channel(payload.channel);
        router.dispatcher().dispatch(Event::ChannelCreate(channel));
        Ok(())
    }

    pub fn update(router: &EventRouter, payload: UpdatePayload<Channel>) -> HandlerResult<()> {
        let old = router.store().channel(payload.new.id).unwrap_or(payload.old);
        let new = router.store().upsert_channel(payload.new);
        router.dispatcher().dispatch(Event::ChannelUpdate { old, new });
        Ok(())
    }

    pub fn delete(router: &EventRouter, payload: ChannelPayload) -> HandlerResult<()> {
        let channel = router
            .store()
            .remove_channel(payload.channel.id)
            .unwrap_or(payload.channel);
        router.dispatcher().dispatch(Event::ChannelDelete(channel));
        Ok(())
    }
}
