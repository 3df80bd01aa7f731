//! Guild handlers

use super::{EventRouter, HandlerResult};
use crate::events::Event;
use crate::protocol::{GuildPayload, UpdatePayload};
use ferris_core::Guild;

/// Handles `GuildCreate` / `GuildUpdate` / `GuildDelete`
pub struct GuildHandler;

impl GuildHandler {
    pub fn create(router: &EventRouter, payload: GuildPayload) -> HandlerResult<()> {
        let guild = router.store().upsert_guild(payload.guild);
        router.dispatcher().dispatch(Event::GuildCreate(guild));
        Ok(())
    }

    pub fn update(router: &EventRouter, payload: UpdatePayload<Guild>) -> HandlerResult<()> {
        let old = router.store().guild(payload.new.id).unwrap_or(payload.old);
        let new = router.store().upsert_guild(payload.new);
        router.dispatcher().dispatch(Event::GuildUpdate { old, new });
        Ok(())
    }

    /// Removing a guild also drops its channels, members, roles and invites
    pub fn delete(router: &EventRouter, payload: GuildPayload) -> HandlerResult<()> {
        let guild = router
            .store()
            .remove_guild(payload.guild.id)
            .unwrap_or(payload.guild);
        router.dispatcher().dispatch(Event::GuildDelete(guild));
        Ok(())
    }
}
