//! Message send handler

use super::{HandlerError, HandlerResult, TypingHandler};
use crate::connection::Connection;
use crate::events::{MessageReceivedEvent, ServerEvent};
use crate::protocol::GatewayMessage;
use crate::server::GatewayState;
use chat_core::ConversationId;
use chat_service::{Identity, MessageService, PresenceService, SendMessageRequest};
use serde_json::{json, Value};
use std::sync::Arc;

/// Handles `message:send`
pub struct MessageHandler;

impl MessageHandler {
    /// Persist and fan out a message
    ///
    /// The work runs in its own task so a sender disconnect cannot cancel it
    /// once accepted.
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        request: SendMessageRequest,
    ) -> HandlerResult<Value> {
        super::parse_conversation_id(&request.conversation_id)?;

        let task_state = state.clone();
        let sender = connection.identity().clone();
        let payload = tokio::spawn(async move { Self::process(&task_state, &sender, request).await })
            .await
            .map_err(|e| HandlerError::Internal(format!("Message task failed: {e}")))??;

        Ok(json!({ "message": payload }))
    }

    async fn process(
        state: &GatewayState,
        sender: &Identity,
        request: SendMessageRequest,
    ) -> HandlerResult<MessageReceivedEvent> {
        let message = MessageService::new(state.service_context())
            .send_message(sender, request)
            .await?;

        let payload = MessageReceivedEvent::new(&message, sender);
        let event = GatewayMessage::event(ServerEvent::MessageReceived, &payload);

        state
            .fanout()
            .fan_out(state.service_context(), &message.conversation_id, &event)
            .await;

        Self::finish_typing(state, &message.conversation_id, sender).await;

        Ok(payload)
    }

    /// A sent message ends the sender's typing indicator
    async fn finish_typing(state: &GatewayState, conversation_id: &ConversationId, sender: &Identity) {
        if let Err(e) = PresenceService::new(state.service_context())
            .clear_typing(conversation_id, &sender.user_id)
            .await
        {
            tracing::warn!(
                conversation_id = %conversation_id,
                user_id = %sender.user_id,
                error = %e,
                "Failed to clear typing marker"
            );
        }

        TypingHandler::notify(state, conversation_id, &sender.user_id, false);
    }
}
