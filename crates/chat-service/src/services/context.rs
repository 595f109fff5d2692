//! Service context - dependency container for services
//!
//! Holds the collaborator implementations and the presence store.

use std::sync::Arc;

use chat_cache::PresenceStore;
use chat_core::traits::{ConversationMembership, MessageStore, TokenVerifier, UserDirectory};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// Every collaborator is held behind a trait object so the gateway can run
/// against PostgreSQL in production and in-memory fakes in tests.
#[derive(Clone)]
pub struct ServiceContext {
    users: Arc<dyn UserDirectory>,
    conversations: Arc<dyn ConversationMembership>,
    messages: Arc<dyn MessageStore>,
    tokens: Arc<dyn TokenVerifier>,
    presence: PresenceStore,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        users: Arc<dyn UserDirectory>,
        conversations: Arc<dyn ConversationMembership>,
        messages: Arc<dyn MessageStore>,
        tokens: Arc<dyn TokenVerifier>,
        presence: PresenceStore,
    ) -> Self {
        Self {
            users,
            conversations,
            messages,
            tokens,
            presence,
        }
    }

    /// Start building a context
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    /// Get the user directory
    pub fn users(&self) -> &dyn UserDirectory {
        self.users.as_ref()
    }

    /// Get the conversation membership lookup
    pub fn conversations(&self) -> &dyn ConversationMembership {
        self.conversations.as_ref()
    }

    /// Get the message store
    pub fn messages(&self) -> &dyn MessageStore {
        self.messages.as_ref()
    }

    /// Get the token verifier
    pub fn tokens(&self) -> &dyn TokenVerifier {
        self.tokens.as_ref()
    }

    /// Get the presence store
    pub fn presence_store(&self) -> &PresenceStore {
        &self.presence
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("collaborators", &"...")
            .field("presence", &self.presence)
            .finish()
    }
}

/// Builder for creating ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    users: Option<Arc<dyn UserDirectory>>,
    conversations: Option<Arc<dyn ConversationMembership>>,
    messages: Option<Arc<dyn MessageStore>>,
    tokens: Option<Arc<dyn TokenVerifier>>,
    presence: Option<PresenceStore>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(mut self, users: Arc<dyn UserDirectory>) -> Self {
        self.users = Some(users);
        self
    }

    pub fn conversations(mut self, conversations: Arc<dyn ConversationMembership>) -> Self {
        self.conversations = Some(conversations);
        self
    }

    pub fn messages(mut self, messages: Arc<dyn MessageStore>) -> Self {
        self.messages = Some(messages);
        self
    }

    pub fn tokens(mut self, tokens: Arc<dyn TokenVerifier>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn presence(mut self, presence: PresenceStore) -> Self {
        self.presence = Some(presence);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.users
                .ok_or_else(|| ServiceError::validation("users is required"))?,
            self.conversations
                .ok_or_else(|| ServiceError::validation("conversations is required"))?,
            self.messages
                .ok_or_else(|| ServiceError::validation("messages is required"))?,
            self.tokens
                .ok_or_else(|| ServiceError::validation("tokens is required"))?,
            self.presence
                .ok_or_else(|| ServiceError::validation("presence is required"))?,
        ))
    }
}
