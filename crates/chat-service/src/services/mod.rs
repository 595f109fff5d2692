//! Business logic services
//!
//! Authentication, membership checks, message persistence, and presence
//! changes behind the gateway's event handlers.

pub mod auth;
pub mod context;
pub mod conversation;
pub mod error;
pub mod message;
pub mod presence;

#[cfg(test)]
mod test_support;

// Re-export all services for convenience
pub use auth::{AuthService, Identity};
pub use context::{ServiceContext, ServiceContextBuilder};
pub use conversation::ConversationService;
pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use message::MessageService;
pub use presence::PresenceService;
