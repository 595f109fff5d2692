//! Presence storage module.
//!
//! Tracks user online status and typing indicators.

mod user_presence;

pub use user_presence::{
    PresenceRecord, PresenceStatus, PresenceStore, DEFAULT_PRESENCE_TTL, DEFAULT_TYPING_TTL,
};
