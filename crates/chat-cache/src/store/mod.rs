//! Key/value store abstraction used by the presence layer.
//!
//! Presence and typing state only needs string values with optional TTLs,
//! plain string sets, and prefix scans. Any backend that can offer those
//! (Redis in production, [`MemoryStore`] for single-process deployments and
//! tests) can back the [`PresenceStore`](crate::PresenceStore).

mod memory;

use async_trait::async_trait;
use std::time::Duration;

use crate::error::CacheResult;

pub use memory::MemoryStore;

/// TTL-capable string key/value store with set support
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the value of a live key
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Write a value, replacing any previous value and TTL
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()>;

    /// Delete a key, returning whether it existed
    async fn delete(&self, key: &str) -> CacheResult<bool>;

    /// Delete several keys, returning how many existed
    async fn delete_many(&self, keys: &[String]) -> CacheResult<u64>;

    /// Add a member to the set stored at `key`
    async fn set_add(&self, key: &str, member: &str) -> CacheResult<()>;

    /// Remove a member from the set stored at `key`
    async fn set_remove(&self, key: &str, member: &str) -> CacheResult<()>;

    /// List the members of the set stored at `key`
    async fn set_members(&self, key: &str) -> CacheResult<Vec<String>>;

    /// List every live key starting with `prefix`
    async fn scan_prefix(&self, prefix: &str) -> CacheResult<Vec<String>>;

    /// Check whether a key is live
    async fn exists(&self, key: &str) -> CacheResult<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
