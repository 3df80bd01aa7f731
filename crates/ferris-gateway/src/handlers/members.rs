//! Member and member-role handlers

use super::{EventRouter, HandlerResult};
use crate::events::Event;
use crate::protocol::{MemberPayload, MemberRolePayload, UpdatePayload};
use ferris_core::Member;

/// Handles `MemberCreate` / `MemberUpdate` / `MemberDelete` and member roles
pub struct MemberHandler;

impl MemberHandler {
    pub fn create(router: &EventRouter, payload: MemberPayload) -> HandlerResult<()> {
        let member = router.store().upsert_member(payload.member);
        router.dispatcher().dispatch(Event::MemberCreate(member));
        Ok(())
    }

    pub fn update(router: &EventRouter, payload: UpdatePayload<Member>) -> HandlerResult<()> {
        let (guild_id, user_id) = payload.new.key();
        let old = router.store().member(guild_id, user_id).unwrap_or(payload.old);
        let new = router.store().upsert_member(payload.new);
        router.dispatcher().dispatch(Event::MemberUpdate { old, new });
        Ok(())
    }

    pub fn delete(router: &EventRouter, payload: MemberPayload) -> HandlerResult<()> {
        let (guild_id, user_id) = payload.member.key();
        let member = router
            .store()
            .remove_member(guild_id, user_id)
            .unwrap_or(payload.member);
        router.dispatcher().dispatch(Event::MemberDelete(member));
        Ok(())
    }

    pub fn role_add(router: &EventRouter, payload: MemberRolePayload) -> HandlerResult<()> {
        let role = router.store().upsert_role(payload.role);
        let (guild_id, user_id) = payload.member.key();
        router.store().upsert_member(payload.member);
        let member = router.store().add_member_role(guild_id, user_id, role.id);
        router.dispatcher().dispatch(Event::MemberRoleAdd { member, role });
        Ok(())
    }

    pub fn role_remove(router: &EventRouter, payload: MemberRolePayload) -> HandlerResult<()> {
        let role = router.store().upsert_role(payload.role);
        let (guild_id, user_id) = payload.member.key();
        let cached = router.store().upsert_member(payload.member);
        let member = router
            .store()
            .remove_member_role(guild_id, user_id, role.id)
            .unwrap_or(cached);
        router.dispatcher().dispatch(Event::MemberRoleRemove { member, role });
        Ok(())
    }
}
