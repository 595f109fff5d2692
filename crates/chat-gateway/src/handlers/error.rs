//! Handler error types

use crate::protocol::{CloseCode, ErrorCode};
use chat_service::{ErrorKind, ServiceError};
use thiserror::Error;

/// Handler error type
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Invalid payload received
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Event name not understood
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    /// Handshake sent on an authenticated connection
    #[error("Already authenticated")]
    AlreadyAuthenticated,

    /// Service error
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Cache error
    #[error("Cache error: {0}")]
    Cache(#[from] chat_cache::CacheError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Wire code reported to the client
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidPayload(_) | Self::AlreadyAuthenticated => ErrorCode::BadRequest,
            Self::UnknownEvent(_) => ErrorCode::UnknownEvent,
            Self::Service(e) => e.kind().into(),
            Self::Cache(_) | Self::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Message safe to show the client; internal details stay in the logs
    pub fn client_message(&self) -> String {
        match self.error_code() {
            ErrorCode::InternalError => "Internal server error".to_string(),
            _ => match self {
                Self::Service(e) => e.to_string(),
                other => other.to_string(),
            },
        }
    }

    /// Close code for errors that end the connection
    pub fn to_close_code(&self) -> Option<CloseCode> {
        match self {
            Self::Service(e) if e.kind() == ErrorKind::Auth => {
                Some(CloseCode::AuthenticationFailed)
            }
            _ => None,
        }
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
