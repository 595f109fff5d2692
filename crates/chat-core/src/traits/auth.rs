//! Token verification port

use async_trait::async_trait;

use crate::traits::RepoResult;
use crate::value_objects::UserId;

/// Claims extracted from a successfully verified bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject_id: UserId,
    pub email: String,
}

/// Verifies bearer tokens presented at handshake
///
/// Implementations return [`DomainError::InvalidToken`] or
/// [`DomainError::TokenExpired`] for tokens that must be rejected.
///
/// [`DomainError::InvalidToken`]: crate::DomainError::InvalidToken
/// [`DomainError::TokenExpired`]: crate::DomainError::TokenExpired
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> RepoResult<VerifiedToken>;
}
