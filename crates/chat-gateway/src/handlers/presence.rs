//! Presence update handler

use super::{HandlerError, HandlerResult};
use crate::connection::Connection;
use crate::events::{ServerEvent, UserOnlineEvent};
use crate::protocol::{GatewayMessage, PresenceUpdatePayload};
use crate::server::GatewayState;
use chat_cache::PresenceStatus;
use chat_common::OfflinePolicy;
use chat_core::UserId;
use chat_service::PresenceService;
use serde_json::{json, Value};
use std::sync::Arc;

/// Handles `presence:update`
pub struct PresenceHandler;

impl PresenceHandler {
    /// Store the new status and broadcast it to every connection
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: PresenceUpdatePayload,
    ) -> HandlerResult<Value> {
        let status: PresenceStatus = payload.status.parse().map_err(|_| {
            HandlerError::InvalidPayload(format!(
                "Invalid status: {}. Must be one of: online, away, busy",
                payload.status
            ))
        })?;

        let user_id = connection.user_id();
        PresenceService::new(state.service_context())
            .update_status(user_id, status)
            .await?;

        let sent = state.connection_manager().broadcast(&GatewayMessage::event(
            ServerEvent::UserOnline,
            UserOnlineEvent {
                user_id: user_id.clone(),
                name: connection.identity().name.clone(),
                status: status.to_string(),
            },
        ));

        tracing::debug!(
            connection_id = %connection.id(),
            user_id = %user_id,
            status = %status,
            sent = sent,
            "Presence updated"
        );

        Ok(json!({ "status": status }))
    }

    /// Clear the user's presence if the offline policy says a closed connection ends it
    ///
    /// Returns whether the user went offline. Under `LastConnection` a
    /// handshake reserves its user before writing presence, so a reservation
    /// seen after the clear means that write may have been lost; the record
    /// is written again and the user stays online.
    pub async fn release(state: &GatewayState, user_id: &UserId) -> bool {
        let manager = state.connection_manager();
        let last_connection = state.config().offline_policy == OfflinePolicy::LastConnection;

        if last_connection && manager.has_user_connections(user_id) {
            tracing::debug!(user_id = %user_id, "User still connected elsewhere");
            return false;
        }

        let presence = PresenceService::new(state.service_context());
        if let Err(e) = presence.go_offline(user_id).await {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to clear presence");
        }

        if last_connection && manager.has_user_connections(user_id) {
            tracing::debug!(user_id = %user_id, "User reconnected during cleanup");
            if let Err(e) = presence.go_online(user_id).await {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to restore presence");
            }
            return false;
        }

        true
    }
}
