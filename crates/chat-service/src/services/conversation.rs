//! Conversation membership checks

use chat_core::{ConversationId, DomainError, UserId};
use tracing::instrument;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Conversation service
pub struct ConversationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ConversationService<'a> {
    /// Create a new ConversationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Fail with NotFound unless the conversation exists
    #[instrument(skip(self))]
    pub async fn require_exists(&self, conversation_id: &ConversationId) -> ServiceResult<()> {
        if self.ctx.conversations().exists(conversation_id).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found(
                "Conversation",
                conversation_id.as_str(),
            ))
        }
    }

    /// Fail with Forbidden unless the user participates in the conversation
    #[instrument(skip(self))]
    pub async fn require_participant(
        &self,
        conversation_id: &ConversationId,
        user_id: &UserId,
    ) -> ServiceResult<()> {
        if !conversation_id.is_key_safe() {
            return Err(ServiceError::validation("Invalid conversation id"));
        }

        if self
            .ctx
            .conversations()
            .is_participant(conversation_id, user_id)
            .await?
        {
            Ok(())
        } else {
            Err(DomainError::NotParticipant {
                conversation_id: conversation_id.clone(),
                user_id: user_id.clone(),
            }
            .into())
        }
    }

    /// Every participant of the conversation
    #[instrument(skip(self))]
    pub async fn participant_ids(
        &self,
        conversation_id: &ConversationId,
    ) -> ServiceResult<Vec<UserId>> {
        Ok(self
            .ctx
            .conversations()
            .participant_ids(conversation_id)
            .await?)
    }
}
