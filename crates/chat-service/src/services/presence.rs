//! Presence service
//!
//! Presence and typing state changes for authenticated users. Broadcasting
//! the resulting events is left to the gateway.

use chat_cache::{PresenceRecord, PresenceStatus};
use chat_core::{ConversationId, UserId};
use tracing::{info, instrument};

use super::context::ServiceContext;
use super::conversation::ConversationService;
use super::error::ServiceResult;

/// Presence service
pub struct PresenceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PresenceService<'a> {
    /// Create a new PresenceService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Mark a freshly authenticated user online
    #[instrument(skip(self))]
    pub async fn go_online(&self, user_id: &UserId) -> ServiceResult<PresenceRecord> {
        let record = self
            .ctx
            .presence_store()
            .set_online(user_id, PresenceStatus::Online)
            .await?;
        info!(user_id = %user_id, "User online");
        Ok(record)
    }

    /// Clear presence and every typing marker of the user
    #[instrument(skip(self))]
    pub async fn go_offline(&self, user_id: &UserId) -> ServiceResult<()> {
        self.ctx.presence_store().set_offline(user_id).await?;
        info!(user_id = %user_id, "User offline");
        Ok(())
    }

    /// Overwrite the user's status and refresh its TTL
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        user_id: &UserId,
        status: PresenceStatus,
    ) -> ServiceResult<PresenceRecord> {
        let record = self
            .ctx
            .presence_store()
            .update_status(user_id, status)
            .await?;
        info!(user_id = %user_id, status = %status, "Presence updated");
        Ok(record)
    }

    /// Extend the TTL of a live presence record
    pub async fn refresh(&self, user_id: &UserId) -> ServiceResult<bool> {
        Ok(self.ctx.presence_store().refresh(user_id).await?)
    }

    /// Users currently online
    pub async fn online_user_ids(&self) -> ServiceResult<Vec<UserId>> {
        Ok(self.ctx.presence_store().get_online_user_ids().await?)
    }

    /// Record that a participant started typing
    #[instrument(skip(self))]
    pub async fn start_typing(
        &self,
        conversation_id: &ConversationId,
        user_id: &UserId,
    ) -> ServiceResult<()> {
        ConversationService::new(self.ctx)
            .require_participant(conversation_id, user_id)
            .await?;
        self.ctx
            .presence_store()
            .set_typing(conversation_id, user_id)
            .await?;
        Ok(())
    }

    /// Record that a participant stopped typing
    #[instrument(skip(self))]
    pub async fn stop_typing(
        &self,
        conversation_id: &ConversationId,
        user_id: &UserId,
    ) -> ServiceResult<()> {
        ConversationService::new(self.ctx)
            .require_participant(conversation_id, user_id)
            .await?;
        self.clear_typing(conversation_id, user_id).await
    }

    /// Drop a typing marker without a membership check
    pub async fn clear_typing(
        &self,
        conversation_id: &ConversationId,
        user_id: &UserId,
    ) -> ServiceResult<()> {
        self.ctx
            .presence_store()
            .clear_typing(conversation_id, user_id)
            .await?;
        Ok(())
    }
}
