//! Event handlers
//!
//! Handles incoming client frames based on their event name.

mod conversation;
mod error;
mod handshake;
mod message;
mod presence;
mod typing;

pub use conversation::ConversationHandler;
pub use error::{HandlerError, HandlerResult};
pub use handshake::{HandshakeHandler, TokenSources};
pub use message::MessageHandler;
pub use presence::PresenceHandler;
pub use typing::TypingHandler;

use crate::connection::Connection;
use crate::events::ClientEvent;
use crate::protocol::GatewayMessage;
use crate::server::GatewayState;
use chat_core::ConversationId;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Dispatch frames of an authenticated connection to the appropriate handler
pub struct EventDispatcher;

impl EventDispatcher {
    /// Handle an incoming client frame
    ///
    /// Returns the ack result on success.
    pub async fn dispatch(
        state: &GatewayState,
        connection: &Arc<Connection>,
        message: &GatewayMessage,
    ) -> HandlerResult<Value> {
        let event: ClientEvent = message
            .event
            .parse()
            .map_err(HandlerError::UnknownEvent)?;

        tracing::trace!(
            connection_id = %connection.id(),
            event = %event,
            "Dispatching event"
        );

        match event {
            ClientEvent::Handshake => Err(HandlerError::AlreadyAuthenticated),
            ClientEvent::ConversationJoin => {
                ConversationHandler::join(state, connection, decode(message)?).await
            }
            ClientEvent::ConversationLeave => {
                ConversationHandler::leave(state, connection, decode(message)?).await
            }
            ClientEvent::MessageSend => {
                MessageHandler::handle(state, connection, decode(message)?).await
            }
            ClientEvent::TypingStart => {
                TypingHandler::start(state, connection, decode(message)?).await
            }
            ClientEvent::TypingStop => TypingHandler::stop(state, connection, decode(message)?).await,
            ClientEvent::PresenceUpdate => {
                PresenceHandler::handle(state, connection, decode(message)?).await
            }
        }
    }
}

fn decode<T: DeserializeOwned>(message: &GatewayMessage) -> HandlerResult<T> {
    message.decode_data().map_err(|e| {
        HandlerError::InvalidPayload(format!("Invalid {} payload: {e}", message.event))
    })
}

/// Validate a client-supplied conversation id
pub(crate) fn parse_conversation_id(raw: &str) -> HandlerResult<ConversationId> {
    let conversation_id = ConversationId::from(raw);
    if raw.is_empty() || !conversation_id.is_key_safe() {
        return Err(HandlerError::InvalidPayload(format!(
            "Invalid conversation id: {raw}"
        )));
    }
    Ok(conversation_id)
}
