//! Authentication service
//!
//! Resolves a handshake token into the immutable identity a connection
//! carries for its whole lifetime.

use chat_core::value_objects::UserId;
use tracing::{debug, instrument};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Identity of an authenticated connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
}

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Verify a bearer token and confirm its subject still exists
    ///
    /// Missing, blank, invalid, or expired tokens and unknown users all fail
    /// with an authentication error.
    #[instrument(skip(self, token))]
    pub async fn authenticate(&self, token: Option<&str>) -> ServiceResult<Identity> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::unauthenticated("Missing token"))?;

        let verified = self.ctx.tokens().verify(token).await?;

        if !verified.subject_id.is_key_safe() {
            return Err(ServiceError::unauthenticated("Malformed token subject"));
        }

        let user = self
            .ctx
            .users()
            .find_by_id(&verified.subject_id)
            .await?
            .ok_or_else(|| ServiceError::unauthenticated("User no longer exists"))?;

        debug!(user_id = %user.id, "Token authenticated");

        Ok(Identity {
            user_id: user.id,
            email: verified.email,
            name: user.name,
            avatar: user.avatar,
        })
    }
}
