//! # chat-core
//!
//! Domain layer containing identifiers, entities, and the collaborator traits
//! the real-time core consumes. This crate has zero dependencies on
//! infrastructure (database, cache, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Message, User, MAX_CONTENT_LENGTH};
pub use error::DomainError;
pub use traits::{
    ConversationMembership, MessageStore, RepoResult, TokenVerifier, UserDirectory, VerifiedToken,
};
pub use value_objects::{ConversationId, MessageId, UserId, KEY_SEPARATOR};
