//! Traits implemented by infrastructure crates

mod auth;
mod repositories;

pub use auth::{TokenVerifier, VerifiedToken};
pub use repositories::{ConversationMembership, MessageStore, RepoResult, UserDirectory};
