//! Repository implementations
//!
//! PostgreSQL implementations of the collaborator traits defined in chat-core.

mod conversation;
mod error;
mod message;
mod user;

pub use conversation::PgConversationMembership;
pub use message::PgMessageStore;
pub use user::PgUserDirectory;
