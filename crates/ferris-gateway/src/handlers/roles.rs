//! Role handlers

use super::{EventRouter, HandlerResult};
use crate::events::Event;
use crate::protocol::{RolePayload, UpdatePayload};
use ferris_core::Role;

/// Handles `RoleCreate` / `RoleUpdate` / `RoleDelete`
pub struct RoleHandler;

impl RoleHandler {
    pub fn create(router: &EventRouter, payload: RolePayload) -> HandlerResult<()> {
        let role = router.store().upsert_role(payload.role);
        router.dispatcher().dispatch(Event::RoleCreate(role));
        Ok(())
    }

    pub fn update(router: &EventRouter, payload: UpdatePayload<Role>) -> HandlerResult<()> {
        let old = router.store().role(payload.new.id).unwrap_or(payload.old);
        let new = router.store().upsert_role(payload.new);
        router.dispatcher().dispatch(Event::RoleUpdate { old, new });
        Ok(())
    }

    pub fn delete(router: &EventRouter, payload: RolePayload) -> HandlerResult<()> {
        let role = router
            .store()
            .remove_role(payload.role.id)
            .unwrap_or(payload.role);
        router.dispatcher().dispatch(Event::RoleDelete(role));
        Ok(())
    }
}
