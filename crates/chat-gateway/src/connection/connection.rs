//! Individual WebSocket connection
//!
//! A `Connection` only exists for a socket that completed its handshake, so
//! it always carries the identity resolved at that point.

use crate::protocol::{CloseCode, GatewayMessage};
use chat_core::{ConversationId, UserId};
use chat_service::Identity;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Handshake completed; the connection may act
    Authenticated,
    /// Connection is closed
    Disconnected,
}

/// Item queued for the socket writer
#[derive(Debug, Clone)]
pub enum Outbound {
    Event(GatewayMessage),
    /// Keepalive ping
    Ping,
    /// Send a close frame and stop writing
    Close(CloseCode),
}

/// Failure to queue an outbound item
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("outbound queue is full")]
    QueueFull,
    #[error("connection is closed")]
    Closed,
}

impl<T> From<mpsc::error::TrySendError<T>> for DeliveryError {
    fn from(err: mpsc::error::TrySendError<T>) -> Self {
        match err {
            mpsc::error::TrySendError::Full(_) => Self::QueueFull,
            mpsc::error::TrySendError::Closed(_) => Self::Closed,
        }
    }
}

/// A single authenticated WebSocket connection
pub struct Connection {
    /// Unique connection ID
    id: String,

    /// Identity set at handshake, immutable afterwards
    identity: Identity,

    /// Current connection state
    state: RwLock<ConnectionState>,

    /// Channel to the socket writer
    sender: mpsc::Sender<Outbound>,

    /// Conversations whose broadcast group this connection joined
    groups: RwLock<HashSet<ConversationId>>,

    /// Last inbound frame of any kind
    last_activity: Mutex<Instant>,

    connected_at: DateTime<Utc>,
}

impl Connection {
    /// Create a new authenticated connection
    pub fn new(id: String, identity: Identity, sender: mpsc::Sender<Outbound>) -> Arc<Self> {
        Arc::new(Self {
            id,
            identity,
            state: RwLock::new(ConnectionState::Authenticated),
            sender,
            groups: RwLock::new(HashSet::new()),
            last_activity: Mutex::new(Instant::now()),
            connected_at: Utc::now(),
        })
    }

    /// Generate a new connection ID
    #[must_use]
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Get the connection ID
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn user_id(&self) -> &UserId {
        &self.identity.user_id
    }

    /// Get the current state
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Set the connection state
    pub fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Record inbound activity
    pub fn touch(&self) {
        *self.last_activity.lock() = Instant::now();
    }

    pub fn last_activity(&self) -> Instant {
        *self.last_activity.lock()
    }

    /// Time since the last inbound frame
    pub fn idle_for(&self) -> Duration {
        self.last_activity.lock().elapsed()
    }

    /// Add a broadcast group; returns false if already joined
    pub fn join_group(&self, conversation_id: ConversationId) -> bool {
        self.groups.write().insert(conversation_id)
    }

    /// Remove a broadcast group; returns false if not joined
    pub fn leave_group(&self, conversation_id: &ConversationId) -> bool {
        self.groups.write().remove(conversation_id)
    }

    pub fn is_in_group(&self, conversation_id: &ConversationId) -> bool {
        self.groups.read().contains(conversation_id)
    }

    /// Get all joined groups
    pub fn groups(&self) -> Vec<ConversationId> {
        self.groups.read().iter().cloned().collect()
    }

    /// Queue an event without waiting
    ///
    /// A full queue drops the event for this connection only.
    pub fn send(&self, message: GatewayMessage) -> Result<(), DeliveryError> {
        self.sender.try_send(Outbound::Event(message))?;
        Ok(())
    }

    /// Queue a keepalive ping
    pub fn ping(&self) -> Result<(), DeliveryError> {
        self.sender.try_send(Outbound::Ping)?;
        Ok(())
    }

    /// Ask the writer to close the socket with `code`, waiting up to `wait` for queue space
    pub async fn close(&self, code: CloseCode, wait: Duration) -> Result<(), DeliveryError> {
        match self
            .sender
            .send_timeout(Outbound::Close(code), wait)
            .await
        {
            Ok(()) => Ok(()),
            Err(mpsc::error::SendTimeoutError::Timeout(_)) => Err(DeliveryError::QueueFull),
            Err(mpsc::error::SendTimeoutError::Closed(_)) => Err(DeliveryError::Closed),
        }
    }

    /// Check if the writer side is gone
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("user_id", &self.identity.user_id)
            .field("state", &self.state())
            .field("connected_at", &self.connected_at)
            .finish()
    }
}
