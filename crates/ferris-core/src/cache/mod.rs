//! In-memory entity cache

mod entity_store;

pub use entity_store::{EntityStore, DEFAULT_MAX_MESSAGES};
