//! PostgreSQL implementation of ConversationMembership

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use chat_core::traits::{ConversationMembership, RepoResult};
use chat_core::value_objects::{ConversationId, UserId};

use super::error::map_db_error;

/// PostgreSQL implementation of ConversationMembership
#[derive(Clone)]
pub struct PgConversationMembership {
    pool: PgPool,
}

impl PgConversationMembership {
    /// Create a new PgConversationMembership
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationMembership for PgConversationMembership {
    #[instrument(skip(self))]
    async fn exists(&self, conversation_id: &ConversationId) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS(
                SELECT 1 FROM conversations
                WHERE id = $1 AND deleted_at IS NULL
            )
            ",
        )
        .bind(conversation_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(exists)
    }

    #[instrument(skip(self))]
    async fn is_participant(
        &self,
        conversation_id: &ConversationId,
        user_id: &UserId,
    ) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS(
                SELECT 1 FROM conversation_participants
                WHERE conversation_id = $1 AND user_id = $2
            )
            ",
        )
        .bind(conversation_id.as_str())
        .bind(user_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(exists)
    }

    #[instrument(skip(self))]
    async fn participant_ids(&self, conversation_id: &ConversationId) -> RepoResult<Vec<UserId>> {
        let ids: Vec<String> = sqlx::query_scalar(
            r"
            SELECT user_id FROM conversation_participants
            WHERE conversation_id = $1
            ORDER BY user_id
            ",
        )
        .bind(conversation_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(ids.into_iter().map(UserId::new).collect())
    }
}
