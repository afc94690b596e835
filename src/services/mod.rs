pub mod credential;
pub mod messaging;
pub mod parent;
pub mod registration;
pub mod resolver;
pub mod results;

use thiserror::Error;

use crate::auth::AuthError;
use crate::store::StoreError;

/// Domain-level failure taxonomy. Mapped onto HTTP statuses by `ApiError`:
/// validation and conflicts are client errors, integrity faults are server
/// errors even when they look like a missing row.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    /// Data-integrity fault, e.g. an account without its role profile.
    #[error("integrity fault: {0}")]
    Integrity(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        DomainError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        DomainError::Conflict(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        DomainError::Unauthorized(msg.into())
    }
}
