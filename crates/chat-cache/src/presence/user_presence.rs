//! User presence and typing indicators.
//!
//! Presence is an unexpired record under `presence:{user}`; absence means
//! offline. The `online_users` set lists users that went online and is
//! filtered against live records on read, since a record can expire without
//! anyone removing the member. Typing markers live under
//! `typing:{conversation}:{user}` with a short TTL.

use chat_core::{ConversationId, UserId, KEY_SEPARATOR};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{CacheError, CacheResult};
use crate::store::KeyValueStore;

/// Key prefix for user presence
const PRESENCE_PREFIX: &str = "presence:";
/// Key prefix for typing indicators
const TYPING_PREFIX: &str = "typing:";
/// Set of users that went online
const ONLINE_SET_KEY: &str = "online_users";

/// Presence TTL (5 minutes, refreshed by keepalive)
pub const DEFAULT_PRESENCE_TTL: Duration = Duration::from_secs(300);
/// Typing indicator TTL
pub const DEFAULT_TYPING_TTL: Duration = Duration::from_secs(5);

/// User presence status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    #[default]
    Online,
    Away,
    Busy,
}

impl PresenceStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Away => "away",
            Self::Busy => "busy",
        }
    }
}

impl std::fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PresenceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "away" => Ok(Self::Away),
            "busy" => Ok(Self::Busy),
            _ => Err(format!("Invalid status: {s}")),
        }
    }
}

/// Stored presence record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRecord {
    pub user_id: UserId,
    pub status: PresenceStatus,
    /// Last write (Unix milliseconds)
    pub updated_at: i64,
    /// When the record lapses unless refreshed (Unix milliseconds)
    pub expires_at: i64,
}

impl PresenceRecord {
    fn new(user_id: UserId, status: PresenceStatus, ttl: Duration) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            user_id,
            status,
            updated_at: now,
            expires_at: now.saturating_add(i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)),
        }
    }
}

/// Presence and typing store over an injected [`KeyValueStore`]
///
/// All operations are idempotent.
#[derive(Clone)]
pub struct PresenceStore {
    store: Arc<dyn KeyValueStore>,
    presence_ttl: Duration,
    typing_ttl: Duration,
}

impl std::fmt::Debug for PresenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceStore")
            .field("presence_ttl", &self.presence_ttl)
            .field("typing_ttl", &self.typing_ttl)
            .finish_non_exhaustive()
    }
}

impl PresenceStore {
    /// Create a presence store with default TTLs
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_ttls(store, DEFAULT_PRESENCE_TTL, DEFAULT_TYPING_TTL)
    }

    /// Create a presence store with explicit TTLs
    #[must_use]
    pub fn with_ttls(
        store: Arc<dyn KeyValueStore>,
        presence_ttl: Duration,
        typing_ttl: Duration,
    ) -> Self {
        Self {
            store,
            presence_ttl,
            typing_ttl,
        }
    }

    /// Create a presence store from chat-common config
    #[must_use]
    pub fn from_config(store: Arc<dyn KeyValueStore>, config: &chat_common::PresenceConfig) -> Self {
        Self::with_ttls(store, config.presence_ttl(), config.typing_ttl())
    }

    #[must_use]
    pub fn presence_ttl(&self) -> Duration {
        self.presence_ttl
    }

    #[must_use]
    pub fn typing_ttl(&self) -> Duration {
        self.typing_ttl
    }

    fn presence_key(user_id: &UserId) -> String {
        format!("{PRESENCE_PREFIX}{user_id}")
    }

    fn typing_key(conversation_id: &ConversationId, user_id: &UserId) -> String {
        format!("{TYPING_PREFIX}{conversation_id}{KEY_SEPARATOR}{user_id}")
    }

    fn typing_prefix(conversation_id: &ConversationId) -> String {
        format!("{TYPING_PREFIX}{conversation_id}{KEY_SEPARATOR}")
    }

    /// Split `typing:{conversation}:{user}` into its segments
    fn parse_typing_key(key: &str) -> Option<(&str, &str)> {
        key.strip_prefix(TYPING_PREFIX)?.split_once(KEY_SEPARATOR)
    }

    fn ensure_key_safe(segment: &str, safe: bool) -> CacheResult<()> {
        if safe {
            Ok(())
        } else {
            Err(CacheError::InvalidKey(segment.to_string()))
        }
    }

    async fn write_record(&self, record: &PresenceRecord) -> CacheResult<()> {
        let key = Self::presence_key(&record.user_id);
        let value = serde_json::to_string(record)?;
        self.store.set(&key, &value, Some(self.presence_ttl)).await
    }

    /// Write a presence record and add the user to the online set
    pub async fn set_online(
        &self,
        user_id: &UserId,
        status: PresenceStatus,
    ) -> CacheResult<PresenceRecord> {
        Self::ensure_key_safe(user_id.as_str(), user_id.is_key_safe())?;

        let record = PresenceRecord::new(user_id.clone(), status, self.presence_ttl);
        self.write_record(&record).await?;
        self.store.set_add(ONLINE_SET_KEY, user_id.as_str()).await?;

        tracing::debug!(user_id = %user_id, status = %status, "Set user online");
        Ok(record)
    }

    /// Delete the presence record, leave the online set, and purge every typing marker of the user
    ///
    /// Returns the number of typing markers removed.
    pub async fn set_offline(&self, user_id: &UserId) -> CacheResult<u64> {
        self.store.delete(&Self::presence_key(user_id)).await?;
        self.store
            .set_remove(ONLINE_SET_KEY, user_id.as_str())
            .await?;

        let markers: Vec<String> = self
            .store
            .scan_prefix(TYPING_PREFIX)
            .await?
            .into_iter()
            .filter(|key| {
                Self::parse_typing_key(key).is_some_and(|(_, user)| user == user_id.as_str())
            })
            .collect();
        let purged = self.store.delete_many(&markers).await?;

        tracing::debug!(user_id = %user_id, typing_purged = purged, "Set user offline");
        Ok(purged)
    }

    /// Overwrite the status and refresh the TTL without touching the online set
    pub async fn update_status(
        &self,
        user_id: &UserId,
        status: PresenceStatus,
    ) -> CacheResult<PresenceRecord> {
        Self::ensure_key_safe(user_id.as_str(), user_id.is_key_safe())?;

        let record = PresenceRecord::new(user_id.clone(), status, self.presence_ttl);
        self.write_record(&record).await?;

        tracing::debug!(user_id = %user_id, status = %status, "Updated user status");
        Ok(record)
    }

    /// Refresh the TTL of an existing record
    ///
    /// Returns `false` and writes nothing when the user has no live record,
    /// so a refresh can never resurrect a user that went offline.
    pub async fn refresh(&self, user_id: &UserId) -> CacheResult<bool> {
        match self.get_presence(user_id).await? {
            Some(record) => {
                let refreshed = PresenceRecord::new(record.user_id, record.status, self.presence_ttl);
                self.write_record(&refreshed).await?;
                tracing::trace!(user_id = %user_id, "Refreshed presence");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Get the live presence record of a user
    pub async fn get_presence(&self, user_id: &UserId) -> CacheResult<Option<PresenceRecord>> {
        let key = Self::presence_key(user_id);
        match self.store.get(&key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Get the status of a user, `None` when offline
    pub async fn get_status(&self, user_id: &UserId) -> CacheResult<Option<PresenceStatus>> {
        Ok(self.get_presence(user_id).await?.map(|record| record.status))
    }

    /// Check whether a user has a live presence record
    pub async fn is_online(&self, user_id: &UserId) -> CacheResult<bool> {
        self.store.exists(&Self::presence_key(user_id)).await
    }

    /// List users with a live presence record, sorted
    ///
    /// Members whose record has lapsed are dropped from the online set. A
    /// `set_online` can land between the record check and the removal, so
    /// the record is checked again afterwards and the member restored.
    pub async fn get_online_user_ids(&self) -> CacheResult<Vec<UserId>> {
        let members = self.store.set_members(ONLINE_SET_KEY).await?;
        let mut online = Vec::with_capacity(members.len());

        for member in members {
            let user_id = UserId::new(member);
            if self.is_online(&user_id).await? {
                online.push(user_id);
                continue;
            }

            self.store
                .set_remove(ONLINE_SET_KEY, user_id.as_str())
                .await?;
            if self.is_online(&user_id).await? {
                self.store.set_add(ONLINE_SET_KEY, user_id.as_str()).await?;
                online.push(user_id);
            }
        }

        online.sort();
        Ok(online)
    }

    /// Write a short-lived typing marker
    pub async fn set_typing(
        &self,
        conversation_id: &ConversationId,
        user_id: &UserId,
    ) -> CacheResult<()> {
        Self::ensure_key_safe(conversation_id.as_str(), conversation_id.is_key_safe())?;
        Self::ensure_key_safe(user_id.as_str(), user_id.is_key_safe())?;

        let key = Self::typing_key(conversation_id, user_id);
        let started_at = chrono::Utc::now().timestamp_millis().to_string();
        self.store.set(&key, &started_at, Some(self.typing_ttl)).await?;

        tracing::trace!(
            user_id = %user_id,
            conversation_id = %conversation_id,
            "Set typing indicator"
        );
        Ok(())
    }

    /// Remove a typing marker, returning whether one was live
    pub async fn clear_typing(
        &self,
        conversation_id: &ConversationId,
        user_id: &UserId,
    ) -> CacheResult<bool> {
        let key = Self::typing_key(conversation_id, user_id);
        self.store.delete(&key).await
    }

    /// List users with a live typing marker in the conversation, sorted
    pub async fn get_typing_users(
        &self,
        conversation_id: &ConversationId,
    ) -> CacheResult<Vec<UserId>> {
        let prefix = Self::typing_prefix(conversation_id);
        let mut users: Vec<UserId> = self
            .store
            .scan_prefix(&prefix)
            .await?
            .iter()
            .filter_map(|key| key.strip_prefix(&prefix))
            .map(UserId::from)
            .collect();

        users.sort();
        users.dedup();
        Ok(users)
    }
}
