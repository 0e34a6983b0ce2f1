//! Public API trait for the RBAC resolver.

use async_trait::async_trait;
use perses_security::SecurityContext;

use crate::error::AuthorizationError;
use crate::permission::{Action, ProjectPermissions, Scope};

/// Authorization facade consumed by every CRUD service and by the proxy.
///
/// Exactly one implementation is selected at startup. Callers must never
/// branch on which backend is active:
///
/// ```ignore
/// if authz.is_enabled() && !authz.has_permission(&ctx, Action::Delete, project, Scope::Dashboard).await {
///     return Err(AuthorizationError::Forbidden);
/// }
/// ```
#[async_trait]
pub trait AuthorizationClient: Send + Sync {
    /// `false` means every permission check must be skipped, including
    /// code paths that would otherwise require an identity.
    fn is_enabled(&self) -> bool;

    /// Single-decision check. Backend failures collapse to `false`.
    async fn has_permission(
        &self,
        ctx: &SecurityContext,
        action: Action,
        project: &str,
        scope: Scope,
    ) -> bool;

    /// Projects in which `action` on `scope` is granted. `["*"]` means every project.
    ///
    /// # Errors
    ///
    /// - `IdentityRequired` if the context is anonymous
    /// - `Transport` if the remote project listing fails
    /// - `Cancelled` if the request is aborted
    async fn get_user_projects(
        &self,
        ctx: &SecurityContext,
        action: Action,
        scope: Scope,
    ) -> Result<Vec<String>, AuthorizationError>;

    /// Every permission held by the caller, keyed by project (`*` for global).
    /// Remote failures truncate the result rather than failing it.
    ///
    /// # Errors
    ///
    /// - `IdentityRequired` if the context is anonymous
    async fn get_permissions(
        &self,
        ctx: &SecurityContext,
    ) -> Result<ProjectPermissions, AuthorizationError>;

    /// Rebuild the permission index from the role store. A no-op on backends
    /// without a local index.
    ///
    /// # Errors
    ///
    /// - `Store` if any list operation fails; the previous index stays in use
    async fn refresh(&self) -> Result<(), AuthorizationError>;
}
