//! Domain entities - the objects the gateway and REST payloads describe
//!
//! Every entity deserializes from a possibly partial payload and can absorb a
//! newer snapshot of itself through `merge`. Merging skips default-valued
//! fields, see `merge_field`.

mod channel;
mod guild;
mod invite;
mod member;
mod message;
mod role;
mod user;

pub use channel::Channel;
pub use guild::Guild;
pub use invite::Invite;
pub use member::Member;
pub use message::Message;
pub use role::Role;
pub use user::User;

/// Overwrite `slot` unless the incoming value is absent (the type's default)
///
/// Payloads are decoded with every field defaulted, so a missing key and a
/// key set to its default look the same here. A snapshot can therefore never
/// reset a cached field to its default (empty content, zero flags, no
/// avatar); it keeps the cached value.
#[inline]
pub(crate) fn merge_field<T: Default + PartialEq>(slot: &mut T, incoming: T) {
    if incoming != T::default() {
        *slot = incoming;
    }
}
