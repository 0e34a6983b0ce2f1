//! Local cache evaluator: answers queries from the flattened permission index.

use std::sync::Arc;

use parking_lot::RwLock;
use perses_security::SecurityContext;
use rbac_resolver_sdk::{
    Action, Permission, ProjectPermissions, Scope, WILDCARD_PROJECT, permission_set_grants,
};

use super::DomainError;
use super::loader::{RoleGraphLoader, UsersPermissions};

/// Owns the permission index. Readers clone the current snapshot under a read
/// lock, [`LocalEvaluator::refresh`] loads outside the lock and only swaps under
/// the write lock.
pub struct LocalEvaluator {
    loader: RoleGraphLoader,
    guest_permissions: Vec<Permission>,
    index: RwLock<Arc<UsersPermissions>>,
}

impl LocalEvaluator {
    /// Starts with an empty index until the first [`LocalEvaluator::refresh`].
    #[must_use]
    pub fn new(loader: RoleGraphLoader, guest_permissions: Vec<Permission>) -> Self {
        Self {
            loader,
            guest_permissions,
            index: RwLock::new(Arc::new(UsersPermissions::default())),
        }
    }

    fn snapshot(&self) -> Arc<UsersPermissions> {
        Arc::clone(&self.index.read())
    }

    fn guest_grants(&self, action: Action, scope: Scope) -> bool {
        permission_set_grants(&self.guest_permissions, action, scope)
    }

    #[must_use]
    pub fn has_permission(
        &self,
        ctx: &SecurityContext,
        action: Action,
        project: &str,
        scope: Scope,
    ) -> bool {
        let Some(username) = ctx.username() else {
            return true;
        };
        if self.guest_grants(action, scope) {
            return true;
        }

        let index = self.snapshot();
        let grants = |key: &str| {
            index
                .project_permissions(username, key)
                .is_some_and(|perms| permission_set_grants(perms, action, scope))
        };
        if project != WILDCARD_PROJECT && grants(WILDCARD_PROJECT) {
            return true;
        }
        grants(project)
    }

    /// # Errors
    ///
    /// `DomainError::IdentityRequired` for an anonymous context.
    pub fn get_user_projects(
        &self,
        ctx: &SecurityContext,
        action: Action,
        scope: Scope,
    ) -> Result<Vec<String>, DomainError> {
        let username = ctx
            .username()
            .ok_or_else(|| DomainError::identity_required("get_user_projects"))?;
        if self.guest_grants(action, scope) {
            return Ok(vec![WILDCARD_PROJECT.to_owned()]);
        }

        let index = self.snapshot();
        let Some(projects) = index.get(username) else {
            return Ok(Vec::new());
        };
        if projects
            .get(WILDCARD_PROJECT)
            .is_some_and(|perms| permission_set_grants(perms, action, scope))
        {
            return Ok(vec![WILDCARD_PROJECT.to_owned()]);
        }

        Ok(projects
            .iter()
            .filter(|(project, perms)| {
                project.as_str() != WILDCARD_PROJECT && permission_set_grants(perms, action, scope)
            })
            .map(|(project, _)| project.clone())
            .collect())
    }

    /// Copy of the caller's permissions. The `*` key is always present and starts
    /// with the guest permissions.
    ///
    /// # Errors
    ///
    /// `DomainError::IdentityRequired` for an anonymous context.
    pub fn get_permissions(
        &self,
        ctx: &SecurityContext,
    ) -> Result<ProjectPermissions, DomainError> {
        let Some(username) = ctx.username() else {
            tracing::error!("get_permissions called without identity on the local evaluator");
            return Err(DomainError::identity_required("get_permissions"));
        };

        let mut permissions = ProjectPermissions::new();
        permissions.insert(WILDCARD_PROJECT.to_owned(), self.guest_permissions.clone());
        if let Some(projects) = self.snapshot().get(username) {
            for (project, perms) in projects {
                permissions
                    .entry(project.clone())
                    .or_default()
                    .extend_from_slice(perms);
            }
        }
        Ok(permissions)
    }

    /// Rebuilds the index. On failure the previous index stays in place.
    ///
    /// # Errors
    ///
    /// `DomainError::Store` when the role store cannot be listed.
    pub async fn refresh(&self) -> Result<(), DomainError> {
        let fresh = Arc::new(self.loader.load().await?);
        let users = fresh.len();
        *self.index.write() = fresh;
        tracing::debug!(users, "permission index swapped");
        Ok(())
    }
}
