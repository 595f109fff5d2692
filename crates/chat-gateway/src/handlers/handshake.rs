//! Handshake handler
//!
//! Turns the first frame of a socket into an authenticated, registered
//! connection.

use super::{HandlerError, HandlerResult, PresenceHandler};
use crate::connection::Connection;
use crate::events::{ConnectedEvent, ServerEvent, UserOnlineEvent};
use crate::protocol::{GatewayMessage, HandshakePayload};
use crate::server::GatewayState;
use chat_cache::PresenceStatus;
use chat_service::{AuthService, Identity, PresenceService};
use std::sync::Arc;

/// Tokens offered outside the handshake frame
#[derive(Debug, Clone, Default)]
pub struct TokenSources {
    /// `?token=` on the upgrade request
    pub query: Option<String>,
    /// `Authorization: Bearer` on the upgrade request
    pub header: Option<String>,
}

impl TokenSources {
    /// Pick the token by priority: handshake payload, query, header
    pub fn resolve<'a>(&'a self, handshake: &'a HandshakePayload) -> Option<&'a str> {
        let non_blank = |t: &'a Option<String>| {
            t.as_deref().map(str::trim).filter(|t| !t.is_empty())
        };

        handshake
            .token()
            .or_else(|| non_blank(&self.query))
            .or_else(|| non_blank(&self.header))
    }
}

/// Handles the `handshake` event
pub struct HandshakeHandler;

impl HandshakeHandler {
    /// Resolve the identity behind the offered token
    pub async fn authenticate(
        state: &GatewayState,
        payload: &HandshakePayload,
        sources: &TokenSources,
    ) -> HandlerResult<Identity> {
        let identity = AuthService::new(state.service_context())
            .authenticate(sources.resolve(payload))
            .await?;
        Ok(identity)
    }

    /// Mark the user online, register the connection, and announce it
    ///
    /// The connection is reserved for its user before the presence write so
    /// a concurrent cleanup of the user's previous connection keeps the
    /// record. On failure nothing stays registered.
    pub async fn establish(state: &GatewayState, connection: &Arc<Connection>) -> HandlerResult<()> {
        let manager = state.connection_manager();
        let presence = PresenceService::new(state.service_context());
        let user_id = connection.user_id();

        manager.reserve(connection);
        if let Err(e) = presence.go_online(user_id).await {
            manager.release(connection);
            return Err(e.into());
        }

        let online_user_ids = match presence.online_user_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to read online users");
                vec![user_id.clone()]
            }
        };

        manager.register(connection.clone());

        if let Err(e) = connection.send(GatewayMessage::event(
            ServerEvent::Connected,
            ConnectedEvent {
                user_id: user_id.clone(),
                connection_id: connection.id().to_string(),
                online_user_ids,
            },
        )) {
            manager.remove_connection(connection.id());
            PresenceHandler::release(state, user_id).await;
            return Err(HandlerError::Internal(format!("Failed to send connected: {e}")));
        }

        manager.broadcast(&GatewayMessage::event(
            ServerEvent::UserOnline,
            UserOnlineEvent {
                user_id: user_id.clone(),
                name: connection.identity().name.clone(),
                status: PresenceStatus::Online.to_string(),
            },
        ));

        tracing::info!(
            connection_id = %connection.id(),
            user_id = %user_id,
            "Client authenticated"
        );

        Ok(())
    }
}
