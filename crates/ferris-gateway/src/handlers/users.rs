//! User handlers

use super::{EventRouter, HandlerResult};
use crate::events::Event;
use crate::protocol::UserPayload;

/// Handles `UserCreate`
pub struct UserHandler;

impl UserHandler {
    /// Merge into the cached user, or cache a new one
    pub fn create(router: &EventRouter, payload: UserPayload) -> HandlerResult<()> {
        let user = router.store().upsert_user(payload.into_user());
        router.dispatcher().dispatch(Event::UserCreate(user));
        Ok(())
    }
}
