//! Message entity - represents a persisted chat message

use chrono::{DateTime, Utc};

use crate::value_objects::{ConversationId, MessageId, UserId};

/// Maximum message content length in characters
pub const MAX_CONTENT_LENGTH: usize = 2000;

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a new Message stamped with the current time
    pub fn new(
        id: MessageId,
        conversation_id: ConversationId,
        sender_id: UserId,
        content: String,
    ) -> Self {
        Self {
            id,
            conversation_id,
            sender_id,
            content,
            created_at: Utc::now(),
        }
    }

    /// Check whether the given user sent this message
    #[inline]
    pub fn is_sent_by(&self, user_id: &UserId) -> bool {
        &self.sender_id == user_id
    }
}
