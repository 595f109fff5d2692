//! Service layer error types
//!
//! Provides a unified error type for all service operations. Every error
//! falls into one [`ErrorKind`], which is what the gateway reports to clients.

use chat_cache::CacheError;
use chat_common::AppError;
use chat_core::DomainError;
use std::fmt;

/// Client-facing category of a service error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller could not be authenticated; fatal for a connection
    Auth,
    /// Caller is authenticated but not allowed to act on the resource
    Forbidden,
    NotFound,
    Validation,
    /// Store or collaborator failure; details stay server-side
    Internal,
}

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain rule violation
    Domain(DomainError),

    /// Application error (token handling, config, etc.)
    App(AppError),

    /// Authentication failed
    Unauthenticated(String),

    /// Resource not found
    NotFound { resource: &'static str, id: String },

    /// Access denied
    Forbidden(String),

    /// Validation error
    Validation(String),

    /// Internal error
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::App(e) => write!(f, "{e}"),
            Self::Unauthenticated(msg) => write!(f, "Authentication failed: {msg}"),
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            Self::App(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Create an authentication error
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(e) => domain_kind(e),
            Self::App(AppError::Domain(e)) => domain_kind(e),
            Self::App(e) if e.is_auth_error() => ErrorKind::Auth,
            Self::App(AppError::Validation(_)) => ErrorKind::Validation,
            Self::App(AppError::NotFound(_)) => ErrorKind::NotFound,
            Self::App(_) => ErrorKind::Internal,
            Self::Unauthenticated(_) => ErrorKind::Auth,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Check whether this error must end the connection
    pub fn is_auth(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }
}

fn domain_kind(e: &DomainError) -> ErrorKind {
    if e.is_authentication() {
        ErrorKind::Auth
    } else if e.is_not_found() {
        ErrorKind::NotFound
    } else if e.is_authorization() {
        ErrorKind::Forbidden
    } else if e.is_validation() {
        ErrorKind::Validation
    } else {
        ErrorKind::Internal
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Domain(e) => Self::Domain(e),
            other => Self::App(other),
        }
    }
}

impl From<CacheError> for ServiceError {
    fn from(err: CacheError) -> Self {
        Self::Internal(format!("Presence store failure: {err}"))
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::App(e) => e,
            ServiceError::Unauthenticated(_) => AppError::InvalidToken,
            ServiceError::NotFound { resource, id } => {
                AppError::NotFound(format!("{resource} {id}"))
            }
            ServiceError::Forbidden(msg) => {
                AppError::Internal(anyhow::anyhow!("Forbidden: {msg}"))
            }
            ServiceError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
            ServiceError::Validation(msg) => AppError::Validation(msg),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
