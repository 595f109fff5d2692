//! Error codes carried by `error` events

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable code of an `error` event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Missing, invalid, or expired credentials; the connection is closed
    AuthError,
    Forbidden,
    NotFound,
    ValidationError,
    /// Frame could not be decoded or is not allowed in the current state
    BadRequest,
    UnknownEvent,
    InternalError,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthError => "AUTH_ERROR",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",
            Self::UnknownEvent => "UNKNOWN_EVENT",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<chat_service::ErrorKind> for ErrorCode {
    fn from(kind: chat_service::ErrorKind) -> Self {
        use chat_service::ErrorKind;

        match kind {
            ErrorKind::Auth => Self::AuthError,
            ErrorKind::Forbidden => Self::Forbidden,
            ErrorKind::NotFound => Self::NotFound,
            ErrorKind::Validation => Self::ValidationError,
            ErrorKind::Internal => Self::InternalError,
        }
    }
}
