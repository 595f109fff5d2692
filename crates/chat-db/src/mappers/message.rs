//! Message entity <-> model mapper

use chat_core::entities::Message;
use chat_core::value_objects::{ConversationId, MessageId, UserId};

use crate::models::MessageModel;

/// Convert MessageModel to Message entity
impl From<MessageModel> for Message {
    fn from(model: MessageModel) -> Self {
        Message {
            id: MessageId::new(model.id),
            conversation_id: ConversationId::new(model.conversation_id),
            sender_id: UserId::new(model.sender_id),
            content: model.content,
            created_at: model.created_at,
        }
    }
}

/// Values bound when inserting a message
pub struct MessageInsert<'a> {
    pub id: String,
    pub conversation_id: &'a str,
    pub sender_id: &'a str,
    pub content: &'a str,
}

impl<'a> MessageInsert<'a> {
    /// Prepare an insert with a freshly generated id
    pub fn new(conversation_id: &'a ConversationId, sender_id: &'a UserId, content: &'a str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: conversation_id.as_str(),
            sender_id: sender_id.as_str(),
            content,
        }
    }
}
