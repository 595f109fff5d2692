//! Test fixtures
//!
//! In-memory stand-ins for the user directory, conversation membership,
//! message persistence, and the presence key/value store.

use async_trait::async_trait;
use chat_cache::{CacheError, CacheResult, KeyValueStore, MemoryStore};
use chat_core::{
    ConversationId, ConversationMembership, DomainError, Message, MessageId, MessageStore,
    RepoResult, User, UserDirectory, UserId,
};
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// Secret used to sign test tokens
pub const TEST_JWT_SECRET: &str = "integration-test-secret-with-enough-entropy";

/// Users, conversations, and messages shared by one test gateway
#[derive(Default)]
pub struct TestWorld {
    users: RwLock<HashMap<UserId, User>>,
    conversations: RwLock<HashMap<ConversationId, BTreeSet<UserId>>>,
    messages: RwLock<Vec<Message>>,
    next_message: AtomicU64,
    fail_writes: AtomicBool,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, id: &str, name: &str) {
        self.users
            .write()
            .insert(UserId::from(id), User::new(id, name, format!("{id}@example.com")));
    }

    pub fn add_conversation(&self, id: &str, participants: &[&str]) {
        self.conversations.write().insert(
            ConversationId::from(id),
            participants.iter().map(|p| UserId::from(*p)).collect(),
        );
    }

    /// Make every message write fail until switched back
    pub fn fail_message_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn stored_messages(&self) -> Vec<Message> {
        self.messages.read().clone()
    }
}

#[async_trait]
impl UserDirectory for TestWorld {
    async fn find_by_id(&self, id: &UserId) -> RepoResult<Option<User>> {
        Ok(self.users.read().get(id).cloned())
    }
}

#[async_trait]
impl ConversationMembership for TestWorld {
    async fn exists(&self, conversation_id: &ConversationId) -> RepoResult<bool> {
        Ok(self.conversations.read().contains_key(conversation_id))
    }

    async fn is_participant(
        &self,
        conversation_id: &ConversationId,
        user_id: &UserId,
    ) -> RepoResult<bool> {
        Ok(self
            .conversations
            .read()
            .get(conversation_id)
            .is_some_and(|members| members.contains(user_id)))
    }

    async fn participant_ids(&self, conversation_id: &ConversationId) -> RepoResult<Vec<UserId>> {
        Ok(self
            .conversations
            .read()
            .get(conversation_id)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl MessageStore for TestWorld {
    async fn create(
        &self,
        conversation_id: &ConversationId,
        sender_id: &UserId,
        content: &str,
    ) -> RepoResult<Message> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("write refused".to_string()));
        }

        let id = self.next_message.fetch_add(1, Ordering::SeqCst);
        let message = Message::new(
            MessageId::new(format!("msg-{id}")),
            conversation_id.clone(),
            sender_id.clone(),
            content.to_string(),
        );
        self.messages.write().push(message.clone());
        Ok(message)
    }
}

/// Memory-backed presence store that can be switched into failing
#[derive(Default)]
pub struct SwitchableStore {
    inner: MemoryStore,
    failing: AtomicBool,
}

impl SwitchableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every store call fail until switched back
    pub fn fail(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> CacheResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheError::CreatePool("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SwitchableStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.check()?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        self.check()?;
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        self.check()?;
        self.inner.delete(key).await
    }

    async fn delete_many(&self, keys: &[String]) -> CacheResult<u64> {
        self.check()?;
        self.inner.delete_many(keys).await
    }

    async fn set_add(&self, key: &str, member: &str) -> CacheResult<()> {
        self.check()?;
        self.inner.set_add(key, member).await
    }

    async fn set_remove(&self, key: &str, member: &str) -> CacheResult<()> {
        self.check()?;
        self.inner.set_remove(key, member).await
    }

    async fn set_members(&self, key: &str) -> CacheResult<Vec<String>> {
        self.check()?;
        self.inner.set_members(key).await
    }

    async fn scan_prefix(&self, prefix: &str) -> CacheResult<Vec<String>> {
        self.check()?;
        self.inner.scan_prefix(prefix).await
    }
}
