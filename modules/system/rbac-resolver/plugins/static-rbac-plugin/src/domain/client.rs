//! `RoleStore` implementation for the static service.

use async_trait::async_trait;
use rbac_resolver_sdk::{
    GlobalRole, GlobalRoleBinding, Role, RoleBinding, RoleStore, StoreError, User,
};

use super::service::Service;

#[async_trait]
impl RoleStore for Service {
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users())
    }

    async fn list_roles(&self, project: Option<&str>) -> Result<Vec<Role>, StoreError> {
        Ok(self.roles(project))
    }

    async fn list_global_roles(&self) -> Result<Vec<GlobalRole>, StoreError> {
        Ok(self.global_roles())
    }

    async fn list_role_bindings(
        &self,
        project: Option<&str>,
    ) -> Result<Vec<RoleBinding>, StoreError> {
        Ok(self.role_bindings(project))
    }

    async fn list_global_role_bindings(&self) -> Result<Vec<GlobalRoleBinding>, StoreError> {
        Ok(self.global_role_bindings())
    }
}
