//! Event payload definitions
//!
//! Defines the data structures for each server event. Field names are camelCase on the wire.

use crate::protocol::ErrorCode;
use chat_core::{ConversationId, Message, MessageId, UserId};
use chat_service::Identity;
use serde::{Deserialize, Serialize};

// === Connection Events ===

/// `connected` event payload
///
/// Sent to a connection right after its handshake succeeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedEvent {
    pub user_id: UserId,
    pub connection_id: String,
    /// Users online at handshake time, including the new user
    pub online_user_ids: Vec<UserId>,
}

/// `error` event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub message: String,
    pub code: ErrorCode,
}

// === Presence Events ===

/// `user:online` event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOnlineEvent {
    pub user_id: UserId,
    pub name: String,
    pub status: String,
}

/// `user:offline` event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOfflineEvent {
    pub user_id: UserId,
}

// === Message Events ===

/// Author summary embedded in a delivered message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderPayload {
    pub id: UserId,
    pub name: String,
    pub avatar: Option<String>,
}

impl From<&Identity> for SenderPayload {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.user_id.clone(),
            name: identity.name.clone(),
            avatar: identity.avatar.clone(),
        }
    }
}

/// `message:received` event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReceivedEvent {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender: SenderPayload,
    pub content: String,
    /// RFC 3339 timestamp
    pub created_at: String,
}

impl MessageReceivedEvent {
    /// Build the delivery payload of a persisted message
    #[must_use]
    pub fn new(message: &Message, sender: &Identity) -> Self {
        Self {
            id: message.id.clone(),
            conversation_id: message.conversation_id.clone(),
            sender: SenderPayload::from(sender),
            content: message.content.clone(),
            created_at: message.created_at.to_rfc3339(),
        }
    }
}

// === Typing Events ===

/// `typing:update` event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingUpdateEvent {
    pub conversation_id: ConversationId,
    pub user_id: UserId,
    pub is_typing: bool,
}
