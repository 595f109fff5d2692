//! Event broadcasting
//!
//! Delivers message events to every live connection of a conversation's participants.

mod fanout;

pub use fanout::{DeliveryReport, FanoutEngine};
