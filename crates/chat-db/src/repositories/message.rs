//! PostgreSQL implementation of MessageStore

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use chat_core::entities::Message;
use chat_core::traits::{MessageStore, RepoResult};
use chat_core::value_objects::{ConversationId, UserId};

use crate::mappers::MessageInsert;
use crate::models::MessageModel;

use super::error::map_db_error;

/// PostgreSQL implementation of MessageStore
#[derive(Clone)]
pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    /// Create a new PgMessageStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    #[instrument(skip(self, content), fields(content_len = content.len()))]
    async fn create(
        &self,
        conversation_id: &ConversationId,
        sender_id: &UserId,
        content: &str,
    ) -> RepoResult<Message> {
        let insert = MessageInsert::new(conversation_id, sender_id, content);

        let model = sqlx::query_as::<_, MessageModel>(
            r"
            INSERT INTO messages (id, conversation_id, sender_id, content, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, conversation_id, sender_id, content, created_at
            ",
        )
        .bind(&insert.id)
        .bind(insert.conversation_id)
        .bind(insert.sender_id)
        .bind(insert.content)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Message::from(model))
    }
}
