//! Connection manager
//!
//! Process-local registry of authenticated connections, indexed by
//! connection id, by user, and by broadcast group. Uses DashMap for
//! thread-safe access.

use super::{Connection, ConnectionState};
use crate::protocol::GatewayMessage;
use chat_common::FanoutStrategy;
use chat_core::{ConversationId, UserId};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;

/// Manages all active WebSocket connections
pub struct ConnectionManager {
    /// Active connections by connection ID
    connections: DashMap<String, Arc<Connection>>,

    /// User ID to connection IDs mapping
    user_connections: DashMap<UserId, HashSet<String>>,

    /// Conversation ID to connection IDs of its broadcast group
    group_connections: DashMap<ConversationId, HashSet<String>>,
}

impl ConnectionManager {
    /// Create a new connection manager
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            user_connections: DashMap::new(),
            group_connections: DashMap::new(),
        }
    }

    /// Create a new connection manager wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Count a connection toward its user before it can receive events
    ///
    /// `has_user_connections` sees the user from here on, while nothing is
    /// delivered to the connection until `register`.
    pub fn reserve(&self, connection: &Connection) {
        self.user_connections
            .entry(connection.user_id().clone())
            .or_default()
            .insert(connection.id().to_string());
    }

    /// Undo a `reserve` for a connection that never got registered
    pub fn release(&self, connection: &Connection) {
        if self.connections.contains_key(connection.id()) {
            return;
        }
        self.unindex_user(connection.user_id(), connection.id());
    }

    /// Register an authenticated connection
    pub fn register(&self, connection: Arc<Connection>) {
        let id = connection.id().to_string();
        let user_id = connection.user_id().clone();

        self.reserve(&connection);
        self.connections.insert(id.clone(), connection);

        tracing::debug!(connection_id = %id, user_id = %user_id, "Connection registered");
    }

    /// Remove a connection from every index
    ///
    /// Uses `alter` + `remove_if` so concurrent registrations for the same
    /// user or group are never dropped.
    pub fn remove_connection(&self, connection_id: &str) -> Option<Arc<Connection>> {
        let (_, connection) = self.connections.remove(connection_id)?;
        connection.set_state(ConnectionState::Disconnected);

        self.unindex_user(connection.user_id(), connection_id);

        for conversation_id in connection.groups() {
            self.remove_from_group(connection_id, &conversation_id);
        }

        tracing::debug!(connection_id = %connection_id, "Connection removed");

        Some(connection)
    }

    fn unindex_user(&self, user_id: &UserId, connection_id: &str) {
        self.user_connections.alter(user_id, |_, mut ids| {
            ids.remove(connection_id);
            ids
        });
        self.user_connections
            .remove_if(user_id, |_, ids| ids.is_empty());
    }

    /// Get a connection by ID
    pub fn get_connection(&self, connection_id: &str) -> Option<Arc<Connection>> {
        self.connections.get(connection_id).map(|r| r.clone())
    }

    /// Add a connection to a conversation's broadcast group
    pub fn join_group(&self, connection_id: &str, conversation_id: &ConversationId) -> bool {
        let Some(connection) = self.get_connection(connection_id) else {
            return false;
        };

        connection.join_group(conversation_id.clone());
        self.group_connections
            .entry(conversation_id.clone())
            .or_default()
            .insert(connection_id.to_string());

        tracing::trace!(
            connection_id = %connection_id,
            conversation_id = %conversation_id,
            "Connection joined group"
        );

        true
    }

    /// Remove a connection from a conversation's broadcast group
    pub fn leave_group(&self, connection_id: &str, conversation_id: &ConversationId) -> bool {
        let Some(connection) = self.get_connection(connection_id) else {
            return false;
        };

        connection.leave_group(conversation_id);
        self.remove_from_group(connection_id, conversation_id);

        tracing::trace!(
            connection_id = %connection_id,
            conversation_id = %conversation_id,
            "Connection left group"
        );

        true
    }

    fn remove_from_group(&self, connection_id: &str, conversation_id: &ConversationId) {
        self.group_connections.alter(conversation_id, |_, mut ids| {
            ids.remove(connection_id);
            ids
        });
        self.group_connections
            .remove_if(conversation_id, |_, ids| ids.is_empty());
    }

    /// Connection IDs currently in a group
    pub fn group_member_ids(&self, conversation_id: &ConversationId) -> HashSet<String> {
        self.group_connections
            .get(conversation_id)
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }

    /// Snapshot of all connections in a group
    pub fn get_group_connections(&self, conversation_id: &ConversationId) -> Vec<Arc<Connection>> {
        self.resolve(self.group_member_ids(conversation_id))
    }

    /// Get all connections of a user through the per-user index
    pub fn get_user_connections(&self, user_id: &UserId) -> Vec<Arc<Connection>> {
        let ids = self
            .user_connections
            .get(user_id)
            .map(|ids| ids.clone())
            .unwrap_or_default();
        self.resolve(ids)
    }

    /// Get all connections of a user by walking every registered connection
    pub fn scan_user_connections(&self, user_id: &UserId) -> Vec<Arc<Connection>> {
        self.connections
            .iter()
            .filter(|entry| entry.user_id() == user_id)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Get all connections of a user with the given lookup strategy
    pub fn connections_of(&self, user_id: &UserId, strategy: FanoutStrategy) -> Vec<Arc<Connection>> {
        match strategy {
            FanoutStrategy::Indexed => self.get_user_connections(user_id),
            FanoutStrategy::FullScan => self.scan_user_connections(user_id),
        }
    }

    /// Check whether a user still has a live connection on this process
    pub fn has_user_connections(&self, user_id: &UserId) -> bool {
        self.user_connections
            .get(user_id)
            .is_some_and(|ids| !ids.is_empty())
    }

    fn resolve(&self, ids: HashSet<String>) -> Vec<Arc<Connection>> {
        ids.iter()
            .filter_map(|id| self.connections.get(id).map(|c| c.clone()))
            .collect()
    }

    /// Send a message to every connection of a group
    ///
    /// With `exclude_user` set, none of that user's connections receive it.
    pub fn send_to_group(
        &self,
        conversation_id: &ConversationId,
        message: &GatewayMessage,
        exclude_user: Option<&UserId>,
    ) -> usize {
        let mut sent = 0;

        for conn in self.get_group_connections(conversation_id) {
            if exclude_user.is_some_and(|excluded| conn.user_id() == excluded) {
                continue;
            }

            match conn.send(message.clone()) {
                Ok(()) => sent += 1,
                Err(e) => tracing::warn!(
                    connection_id = %conn.id(),
                    error = %e,
                    "Failed to queue group event"
                ),
            }
        }

        tracing::trace!(
            conversation_id = %conversation_id,
            event = %message.event,
            sent = sent,
            "Message sent to group"
        );

        sent
    }

    /// Broadcast a message to all connections
    pub fn broadcast(&self, message: &GatewayMessage) -> usize {
        let connections: Vec<Arc<Connection>> =
            self.connections.iter().map(|r| r.value().clone()).collect();
        let mut sent = 0;

        for conn in connections {
            match conn.send(message.clone()) {
                Ok(()) => sent += 1,
                Err(e) => tracing::warn!(
                    connection_id = %conn.id(),
                    error = %e,
                    "Failed to queue broadcast"
                ),
            }
        }

        tracing::debug!(event = %message.event, sent = sent, "Message broadcast to all connections");

        sent
    }

    /// Get the total number of active connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Get the number of unique users with a live connection
    pub fn user_count(&self) -> usize {
        self.user_connections.len()
    }

    /// Get the number of non-empty broadcast groups
    pub fn group_count(&self) -> usize {
        self.group_connections.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.connections.len())
            .field("users", &self.user_connections.len())
            .field("groups", &self.group_connections.len())
            .finish()
    }
}
