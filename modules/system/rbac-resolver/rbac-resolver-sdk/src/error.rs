//! Error types for the RBAC resolver module.

use thiserror::Error;

/// Errors that can occur when using the authorization facade.
///
/// A denied single-decision check is not an error: `has_permission` returns `false`.
/// These variants cover enumeration failures, misuse of the API and startup failures.
#[derive(Debug, Error)]
pub enum AuthorizationError {
    /// Generic denial surfaced to end callers. Intentionally carries no detail.
    #[error("forbidden")]
    Forbidden,

    /// An identity is required for this operation but the caller is anonymous.
    #[error("identity required: {0}")]
    IdentityRequired(String),

    /// The caller's credentials could not be authenticated.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A role store list operation failed while loading permissions.
    #[error("role store error: {0}")]
    Store(#[from] StoreError),

    /// A remote authorization round trip failed.
    #[error("remote authorizer error: {0}")]
    Transport(String),

    /// The request was cancelled before the remote round trips completed.
    #[error("request cancelled")]
    Cancelled,

    /// Missing or invalid authorization configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Failure reported by a [`crate::RoleStore`] collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to list {collection}: {reason}")]
    ListFailed {
        collection: &'static str,
        reason: String,
    },

    #[error("role store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn list_failed(collection: &'static str, reason: impl Into<String>) -> Self {
        Self::ListFailed {
            collection,
            reason: reason.into(),
        }
    }
}

/// Validation failures of permissions and bindings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("unknown scope '{0}'")]
    UnknownScope(String),

    #[error("a permission requires at least one action and one scope")]
    EmptyPermission,

    #[error("binding '{binding}' has no subject")]
    NoSubject { binding: String },

    #[error("role '{role}' referenced by binding '{binding}' does not exist")]
    RoleNotFound { binding: String, role: String },

    #[error(
        "the role of binding '{binding}' cannot change from '{previous}' to '{requested}', delete and recreate the binding instead"
    )]
    RoleChanged {
        binding: String,
        previous: String,
        requested: String,
    },
}
