//! Message handlers

use super::{EventRouter, HandlerResult};
use crate::events::Event;
use crate::protocol::{MessageDeletePayload, MessagePayload, UpdatePayload};
use ferris_core::Message;

/// Handles `MessageCreate` / `MessageUpdate` / `MessageDelete`
pub struct MessageHandler;

impl MessageHandler {
    pub fn create(router: &EventRouter, payload: MessagePayload) -> HandlerResult<()> {
        let message = router.store().upsert_message(payload.message);
        router.dispatcher().dispatch(Event::Message(message));
        Ok(())
    }

    /// The cached copy, when present, is the authoritative `old`
    pub fn update(router: &EventRouter, payload: UpdatePayload<Message>) -> HandlerResult<()> {
        let old = router.store().message(payload.new.id).unwrap_or(payload.old);
        let new = router.store().upsert_message(payload.new);
        router.dispatcher().dispatch(Event::MessageEdit { old, new });
        Ok(())
    }

    /// Dispatches even when the message was never cached
    pub fn delete(router: &EventRouter, payload: MessageDeletePayload) -> HandlerResult<()> {
        let id = payload.message_id();
        let message = router.store().remove_message(id).unwrap_or_else(|| {
            tracing::debug!(message_id = %id, "Deleted message was not cached");
            let mut message = payload.message;
            message.id = id;
            message
        });
        router.dispatcher().dispatch(Event::MessageDelete(message));
        Ok(())
    }
}
