//! Domain errors for the RBAC resolver.

use rbac_resolver_sdk::{AuthorizationError, StoreError};

/// Internal domain errors.
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("role store error: {0}")]
    Store(#[from] StoreError),

    #[error("identity required: {0}")]
    IdentityRequired(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("remote authorizer error: {0}")]
    Transport(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub(crate) fn identity_required(operation: &str) -> Self {
        Self::IdentityRequired(format!("{operation} requires an authenticated identity"))
    }
}

impl From<AuthorizationError> for DomainError {
    fn from(e: AuthorizationError) -> Self {
        match e {
            AuthorizationError::Store(e) => Self::Store(e),
            AuthorizationError::IdentityRequired(msg) => Self::IdentityRequired(msg),
            AuthorizationError::Unauthorized(msg) => Self::Unauthorized(msg),
            AuthorizationError::Transport(msg) => Self::Transport(msg),
            AuthorizationError::Cancelled => Self::Cancelled,
            AuthorizationError::InvalidConfig(msg) => Self::InvalidConfig(msg),
            AuthorizationError::Forbidden => Self::Internal("forbidden".to_owned()),
            AuthorizationError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<DomainError> for AuthorizationError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Store(e) => Self::Store(e),
            DomainError::IdentityRequired(msg) => Self::IdentityRequired(msg),
            DomainError::Unauthorized(msg) => Self::Unauthorized(msg),
            DomainError::Transport(msg) => Self::Transport(msg),
            DomainError::Cancelled => Self::Cancelled,
            DomainError::InvalidConfig(msg) => Self::InvalidConfig(msg),
            DomainError::Internal(msg) => Self::Internal(msg),
        }
    }
}
