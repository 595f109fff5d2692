//! Gateway event types
//!
//! Defines all event names used in the `event` field of gateway frames.

use std::fmt;
use std::str::FromStr;

/// Events sent by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerEvent {
    /// Sent after a successful handshake
    Connected,
    Error,
    /// Acknowledges a client frame that carried an `ack` id
    Ack,

    // Presence events
    /// User came online or changed status
    UserOnline,
    UserOffline,

    // Message events
    MessageReceived,

    // Typing events
    TypingUpdate,
}

impl ServerEvent {
    /// Get the string representation of the event type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Error => "error",
            Self::Ack => "ack",
            Self::UserOnline => "user:online",
            Self::UserOffline => "user:offline",
            Self::MessageReceived => "message:received",
            Self::TypingUpdate => "typing:update",
        }
    }
}

impl fmt::Display for ServerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events accepted from clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientEvent {
    /// First frame of every connection
    Handshake,
    ConversationJoin,
    ConversationLeave,
    MessageSend,
    TypingStart,
    TypingStop,
    PresenceUpdate,
}

impl ClientEvent {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Handshake => "handshake",
            Self::ConversationJoin => "conversation:join",
            Self::ConversationLeave => "conversation:leave",
            Self::MessageSend => "message:send",
            Self::TypingStart => "typing:start",
            Self::TypingStop => "typing:stop",
            Self::PresenceUpdate => "presence:update",
        }
    }
}

impl FromStr for ClientEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "handshake" => Ok(Self::Handshake),
            "conversation:join" => Ok(Self::ConversationJoin),
            "conversation:leave" => Ok(Self::ConversationLeave),
            "message:send" => Ok(Self::MessageSend),
            "typing:start" => Ok(Self::TypingStart),
            "typing:stop" => Ok(Self::TypingStop),
            "presence:update" => Ok(Self::PresenceUpdate),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for ClientEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
