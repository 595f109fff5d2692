//! Client payload definitions
//!
//! Defines the payload structures for client-to-server events. The
//! `message:send` payload is [`chat_service::SendMessageRequest`].

use serde::{Deserialize, Serialize};

/// Payload of the `handshake` event
///
/// Sent by the client as the first frame to authenticate the connection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandshakePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<HandshakeAuth>,
}

/// Credentials inside a handshake
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandshakeAuth {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl HandshakePayload {
    /// Token carried in the handshake, if any and not blank
    pub fn token(&self) -> Option<&str> {
        self.auth
            .as_ref()
            .and_then(|a| a.token.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Payload of `conversation:join`, `conversation:leave`, and the typing events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationPayload {
    pub conversation_id: String,
}

/// Payload of `presence:update`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceUpdatePayload {
    /// One of: online, away, busy
    pub status: String,
}
