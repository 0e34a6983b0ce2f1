//! Persistence collaborator consumed by the role graph loader.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{GlobalRole, GlobalRoleBinding, Role, RoleBinding, User};

/// Read-only view of the persisted role graph.
///
/// `project = None` lists across every project.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// # Errors
    ///
    /// `StoreError` when the backing storage cannot be read.
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// # Errors
    ///
    /// `StoreError` when the backing storage cannot be read.
    async fn list_roles(&self, project: Option<&str>) -> Result<Vec<Role>, StoreError>;

    /// # Errors
    ///
    /// `StoreError` when the backing storage cannot be read.
    async fn list_global_roles(&self) -> Result<Vec<GlobalRole>, StoreError>;

    /// # Errors
    ///
    /// `StoreError` when the backing storage cannot be read.
    async fn list_role_bindings(&self, project: Option<&str>)
    -> Result<Vec<RoleBinding>, StoreError>;

    /// # Errors
    ///
    /// `StoreError` when the backing storage cannot be read.
    async fn list_global_role_bindings(&self) -> Result<Vec<GlobalRoleBinding>, StoreError>;
}
