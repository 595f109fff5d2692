//! # chat-service
//!
//! Application layer containing the services behind the real-time gateway.

pub mod dto;
pub mod services;

pub use dto::SendMessageRequest;
pub use services::{
    AuthService, ConversationService, ErrorKind, Identity, MessageService, PresenceService,
    ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
};
