//! Message service
//!
//! Validates and persists messages sent over the gateway. Delivery is the
//! gateway's job; this service only guarantees that nothing is delivered
//! unless it was persisted.

use chat_core::entities::Message;
use chat_core::ConversationId;
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::SendMessageRequest;

use super::auth::Identity;
use super::context::ServiceContext;
use super::conversation::ConversationService;
use super::error::{ServiceError, ServiceResult};

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    /// Create a new MessageService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Check membership, validate content, and persist a message
    ///
    /// Fails with NotFound for an unknown conversation, Forbidden when the
    /// sender is not a participant, and Validation for bad content. A
    /// persistence failure surfaces as an internal error.
    #[instrument(skip(self, sender, request), fields(user_id = %sender.user_id))]
    pub async fn send_message(
        &self,
        sender: &Identity,
        request: SendMessageRequest,
    ) -> ServiceResult<Message> {
        let conversation_id = ConversationId::new(request.conversation_id.clone());
        let conversations = ConversationService::new(self.ctx);

        conversations.require_exists(&conversation_id).await?;
        conversations
            .require_participant(&conversation_id, &sender.user_id)
            .await?;

        request
            .validate()
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        let message = self
            .ctx
            .messages()
            .create(&conversation_id, &sender.user_id, &request.content)
            .await?;

        info!(
            message_id = %message.id,
            conversation_id = %conversation_id,
            "Message persisted"
        );

        Ok(message)
    }
}
