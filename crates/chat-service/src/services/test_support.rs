//! In-memory collaborators for service tests

use async_trait::async_trait;
use chat_cache::{MemoryStore, PresenceStore};
use chat_common::{JwtService, TokenType};
use chat_core::{
    ConversationId, ConversationMembership, DomainError, Message, MessageId, MessageStore,
    RepoResult, User, UserDirectory, UserId,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use super::auth::Identity;
use super::context::ServiceContext;

const SECRET: &str = "service-test-secret-that-is-long-enough";

#[derive(Default)]
pub struct FakeUsers(HashMap<UserId, User>);

#[async_trait]
impl UserDirectory for FakeUsers {
    async fn find_by_id(&self, id: &UserId) -> RepoResult<Option<User>> {
        Ok(self.0.get(id).cloned())
    }
}

#[derive(Default)]
pub struct FakeConversations(BTreeMap<ConversationId, BTreeSet<UserId>>);

#[async_trait]
impl ConversationMembership for FakeConversations {
    async fn exists(&self, conversation_id: &ConversationId) -> RepoResult<bool> {
        Ok(self.0.contains_key(conversation_id))
    }

    async fn is_participant(
        &self,
        conversation_id: &ConversationId,
        user_id: &UserId,
    ) -> RepoResult<bool> {
        Ok(self
            .0
            .get(conversation_id)
            .is_some_and(|members| members.contains(user_id)))
    }

    async fn participant_ids(&self, conversation_id: &ConversationId) -> RepoResult<Vec<UserId>> {
        Ok(self
            .0
            .get(conversation_id)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeMessages {
    stored: Mutex<Vec<Message>>,
    next_id: AtomicU64,
    fail: AtomicBool,
}

impl FakeMessages {
    pub fn count(&self) -> usize {
        self.stored.lock().len()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl MessageStore for FakeMessages {
    async fn create(
        &self,
        conversation_id: &ConversationId,
        sender_id: &UserId,
        content: &str,
    ) -> RepoResult<Message> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("write refused".to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let message = Message::new(
            MessageId::new(format!("m{id}")),
            conversation_id.clone(),
            sender_id.clone(),
            content.to_string(),
        );
        self.stored.lock().push(message.clone());
        Ok(message)
    }
}

/// Collaborator state for one test
pub struct TestWorld {
    pub users: FakeUsers,
    pub conversations: FakeConversations,
    pub messages: Arc<FakeMessages>,
    pub jwt: JwtService,
}

impl TestWorld {
    pub fn new() -> Self {
        Self {
            users: FakeUsers::default(),
            conversations: FakeConversations::default(),
            messages: Arc::new(FakeMessages::default()),
            jwt: JwtService::new(SECRET, 900),
        }
    }

    pub fn with_user(mut self, id: &str, name: &str) -> Self {
        self.users
            .0
            .insert(UserId::from(id), User::new(id, name, format!("{id}@example.com")));
        self
    }

    pub fn with_conversation(mut self, id: &str, participants: &[&str]) -> Self {
        self.conversations.0.insert(
            ConversationId::from(id),
            participants.iter().map(|p| UserId::from(*p)).collect(),
        );
        self
    }

    pub fn token_for(&self, id: &str) -> String {
        self.jwt
            .issue_access_token(&UserId::from(id), &format!("{id}@example.com"))
            .unwrap()
    }

    pub fn expired_token_for(&self, id: &str) -> String {
        self.jwt
            .encode_token(
                &UserId::from(id),
                &format!("{id}@example.com"),
                TokenType::Access,
                -3600,
            )
            .unwrap()
    }
}

/// Snapshot the world into a service context
pub fn context(world: &TestWorld) -> ServiceContext {
    ServiceContext::builder()
        .users(Arc::new(FakeUsers(world.users.0.clone())))
        .conversations(Arc::new(FakeConversations(world.conversations.0.clone())))
        .messages(world.messages.clone())
        .tokens(Arc::new(world.jwt.clone()))
        .presence(PresenceStore::new(Arc::new(MemoryStore::new())))
        .build()
        .unwrap()
}

pub fn identity(id: &str, name: &str) -> Identity {
    Identity {
        user_id: UserId::from(id),
        email: format!("{id}@example.com"),
        name: name.to_string(),
        avatar: None,
    }
}
