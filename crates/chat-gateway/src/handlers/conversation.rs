//! Conversation join/leave handlers

use super::{parse_conversation_id, HandlerResult};
use crate::connection::Connection;
use crate::protocol::ConversationPayload;
use crate::server::GatewayState;
use chat_service::{ConversationService, PresenceService};
use serde_json::{json, Value};
use std::sync::Arc;

/// Handles `conversation:join` and `conversation:leave`
pub struct ConversationHandler;

impl ConversationHandler {
    /// Join the conversation's broadcast group after a membership check
    pub async fn join(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: ConversationPayload,
    ) -> HandlerResult<Value> {
        let conversation_id = parse_conversation_id(&payload.conversation_id)?;

        ConversationService::new(state.service_context())
            .require_participant(&conversation_id, connection.user_id())
            .await?;

        state
            .connection_manager()
            .join_group(connection.id(), &conversation_id);

        tracing::debug!(
            connection_id = %connection.id(),
            conversation_id = %conversation_id,
            "Joined conversation"
        );

        Ok(json!({ "conversationId": conversation_id }))
    }

    /// Leave the broadcast group and drop the caller's typing marker
    pub async fn leave(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: ConversationPayload,
    ) -> HandlerResult<Value> {
        let conversation_id = parse_conversation_id(&payload.conversation_id)?;

        state
            .connection_manager()
            .leave_group(connection.id(), &conversation_id);

        PresenceService::new(state.service_context())
            .clear_typing(&conversation_id, connection.user_id())
            .await?;

        tracing::debug!(
            connection_id = %connection.id(),
            conversation_id = %conversation_id,
            "Left conversation"
        );

        Ok(json!({ "conversationId": conversation_id }))
    }
}
