//! Typing indicator handlers

use super::{parse_conversation_id, HandlerResult};
use crate::connection::Connection;
use crate::events::{ServerEvent, TypingUpdateEvent};
use crate::protocol::{ConversationPayload, GatewayMessage};
use crate::server::GatewayState;
use chat_core::{ConversationId, UserId};
use chat_service::PresenceService;
use serde_json::{json, Value};
use std::sync::Arc;

/// Handles `typing:start` and `typing:stop`
pub struct TypingHandler;

impl TypingHandler {
    pub async fn start(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: ConversationPayload,
    ) -> HandlerResult<Value> {
        let conversation_id = parse_conversation_id(&payload.conversation_id)?;

        PresenceService::new(state.service_context())
            .start_typing(&conversation_id, connection.user_id())
            .await?;

        Self::notify(state, &conversation_id, connection.user_id(), true);
        Ok(json!({ "conversationId": conversation_id, "isTyping": true }))
    }

    pub async fn stop(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: ConversationPayload,
    ) -> HandlerResult<Value> {
        let conversation_id = parse_conversation_id(&payload.conversation_id)?;

        PresenceService::new(state.service_context())
            .stop_typing(&conversation_id, connection.user_id())
            .await?;

        Self::notify(state, &conversation_id, connection.user_id(), false);
        Ok(json!({ "conversationId": conversation_id, "isTyping": false }))
    }

    /// Emit `typing:update` to the group, skipping every connection of the typist
    pub fn notify(
        state: &GatewayState,
        conversation_id: &ConversationId,
        user_id: &UserId,
        is_typing: bool,
    ) -> usize {
        let event = GatewayMessage::event(
            ServerEvent::TypingUpdate,
            TypingUpdateEvent {
                conversation_id: conversation_id.clone(),
                user_id: user_id.clone(),
                is_typing,
            },
        );
        state
            .connection_manager()
            .send_to_group(conversation_id, &event, Some(user_id))
    }
}
