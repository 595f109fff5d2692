//! # chat-db
//!
//! PostgreSQL implementations of the collaborator traits the real-time core
//! consumes: user lookup, conversation membership, and message persistence.
//!
//! ## Expected schema
//!
//! The tables are owned by the conversation/message service; this crate only
//! reads them (and inserts into `messages`).
//!
//! ```sql
//! CREATE TABLE users (
//!     id          TEXT PRIMARY KEY,
//!     name        TEXT NOT NULL,
//!     email       TEXT NOT NULL,
//!     avatar      TEXT,
//!     deleted_at  TIMESTAMPTZ
//! );
//! CREATE TABLE conversations (
//!     id          TEXT PRIMARY KEY,
//!     deleted_at  TIMESTAMPTZ
//! );
//! CREATE TABLE conversation_participants (
//!     conversation_id TEXT NOT NULL REFERENCES conversations(id),
//!     user_id         TEXT NOT NULL REFERENCES users(id),
//!     PRIMARY KEY (conversation_id, user_id)
//! );
//! CREATE TABLE messages (
//!     id              TEXT PRIMARY KEY,
//!     conversation_id TEXT NOT NULL REFERENCES conversations(id),
//!     sender_id       TEXT NOT NULL REFERENCES users(id),
//!     content         TEXT NOT NULL,
//!     created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chat_db::{create_pool, PgMessageStore, PoolConfig};
//!
//! let pool = create_pool(&PoolConfig::from(&app_config.database)).await?;
//! let messages = PgMessageStore::new(pool.clone());
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, PgPool, PoolConfig};
pub use repositories::{PgConversationMembership, PgMessageStore, PgUserDirectory};
