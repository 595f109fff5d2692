//! Gateway events
//!
//! Defines the event names in both directions and the payloads of every
//! event the gateway sends to clients.

mod event_types;
mod payloads;

pub use event_types::{ClientEvent, ServerEvent};
pub use payloads::{
    ConnectedEvent, ErrorEvent, MessageReceivedEvent, SenderPayload, TypingUpdateEvent,
    UserOfflineEvent, UserOnlineEvent,
};
