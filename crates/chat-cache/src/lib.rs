//! # chat-cache
//!
//! Ephemeral state layer for presence and typing indicators.
//!
//! ## Features
//!
//! - **Key/value abstraction**: [`KeyValueStore`] with TTLs, sets, and prefix scans
//! - **Connection Pool**: Managed Redis connection pool with deadpool, implementing the store
//! - **Memory store**: Process-local store for single-node deployments and tests
//! - **Presence**: User online status and typing indicators
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use chat_cache::{PresenceStatus, PresenceStore, RedisPool, RedisPoolConfig};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let presence = PresenceStore::new(Arc::new(pool));
//!
//! presence.set_online(&user_id, PresenceStatus::Online).await?;
//! let online = presence.get_online_user_ids().await?;
//! ```

pub mod error;
pub mod pool;
pub mod presence;
pub mod store;

pub use error::{CacheError, CacheResult};
pub use pool::{RedisPool, RedisPoolConfig};
pub use presence::{
    PresenceRecord, PresenceStatus, PresenceStore, DEFAULT_PRESENCE_TTL, DEFAULT_TYPING_TTL,
};
pub use store::{KeyValueStore, MemoryStore};
