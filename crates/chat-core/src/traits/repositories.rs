//! Collaborator traits (ports) - the interfaces the real-time core consumes
//!
//! Conversation CRUD, message persistence, user accounts and token issuance
//! all live outside this system. The domain layer defines what it needs from
//! them here, and infrastructure crates provide the implementations.

use async_trait::async_trait;

use crate::entities::{Message, User};
use crate::error::DomainError;
use crate::value_objects::{ConversationId, UserId};

/// Result type for collaborator operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Directory
// ============================================================================

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: &UserId) -> RepoResult<Option<User>>;
}

// ============================================================================
// Conversation Membership
// ============================================================================

#[async_trait]
pub trait ConversationMembership: Send + Sync {
    /// Check whether the conversation exists
    async fn exists(&self, conversation_id: &ConversationId) -> RepoResult<bool>;

    /// Check whether a user participates in the conversation
    async fn is_participant(
        &self,
        conversation_id: &ConversationId,
        user_id: &UserId,
    ) -> RepoResult<bool>;

    /// List every participant of the conversation
    async fn participant_ids(&self, conversation_id: &ConversationId) -> RepoResult<Vec<UserId>>;
}

// ============================================================================
// Message Store
// ============================================================================

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a new message and return it with its assigned id and timestamp
    async fn create(
        &self,
        conversation_id: &ConversationId,
        sender_id: &UserId,
        content: &str,
    ) -> RepoResult<Message>;
}
