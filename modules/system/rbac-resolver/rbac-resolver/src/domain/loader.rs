//! Role graph loader: flattens the persisted role graph into a per-user permission index.

use std::collections::HashMap;
use std::sync::Arc;

use rbac_resolver_sdk::{
    GlobalRole, GlobalRoleBinding, Permission, ProjectPermissions, Role, RoleBinding, RoleStore,
    SubjectKind, User, WILDCARD_PROJECT,
};

use super::DomainError;

/// `username -> project (or "*") -> permissions`.
///
/// Entries accumulate and are never deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsersPermissions {
    users: HashMap<String, ProjectPermissions>,
}

impl UsersPermissions {
    pub fn add_entry(&mut self, user: &str, project: &str, permissions: &[Permission]) {
        self.users
            .entry(user.to_owned())
            .or_default()
            .entry(project.to_owned())
            .or_default()
            .extend_from_slice(permissions);
    }

    #[must_use]
    pub fn get(&self, user: &str) -> Option<&ProjectPermissions> {
        self.users.get(user)
    }

    #[must_use]
    pub fn project_permissions(&self, user: &str, project: &str) -> Option<&[Permission]> {
        self.users
            .get(user)
            .and_then(|projects| projects.get(project))
            .map(Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// The five collections a refresh reads.
#[derive(Debug, Clone, Default)]
pub struct RoleGraph {
    pub users: Vec<User>,
    pub roles: Vec<Role>,
    pub global_roles: Vec<GlobalRole>,
    pub role_bindings: Vec<RoleBinding>,
    pub global_role_bindings: Vec<GlobalRoleBinding>,
}

impl RoleGraph {
    /// Flattens the graph. A binding referencing a missing role is skipped with a warning.
    #[must_use]
    pub fn flatten(&self) -> UsersPermissions {
        let global_roles: HashMap<&str, &GlobalRole> = self
            .global_roles
            .iter()
            .map(|r| (r.name.as_str(), r))
            .collect();
        let roles: HashMap<(&str, &str), &Role> = self
            .roles
            .iter()
            .map(|r| ((r.project.as_str(), r.name.as_str()), r))
            .collect();

        let mut index = UsersPermissions::default();
        for user in &self.users {
            for binding in &self.global_role_bindings {
                if !binding.has(SubjectKind::User, &user.name) {
                    continue;
                }
                let Some(role) = global_roles.get(binding.role.as_str()) else {
                    tracing::warn!(
                        user = %user.name,
                        binding = %binding.name,
                        role = %binding.role,
                        "global role binding references an unknown global role, skipping"
                    );
                    continue;
                };
                index.add_entry(&user.name, WILDCARD_PROJECT, &role.permissions);
            }

            for binding in &self.role_bindings {
                if !binding.has(SubjectKind::User, &user.name) {
                    continue;
                }
                let Some(role) = roles.get(&(binding.project.as_str(), binding.role.as_str()))
                else {
                    tracing::warn!(
                        user = %user.name,
                        project = %binding.project,
                        binding = %binding.name,
                        role = %binding.role,
                        "role binding references an unknown role, skipping"
                    );
                    continue;
                };
                index.add_entry(&user.name, &binding.project, &role.permissions);
            }
        }
        index
    }
}

/// Reads the role graph from the [`RoleStore`] and flattens it.
#[derive(Clone)]
pub struct RoleGraphLoader {
    store: Arc<dyn RoleStore>,
}

impl RoleGraphLoader {
    #[must_use]
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self { store }
    }

    /// # Errors
    ///
    /// `DomainError::Store` if any of the five list operations fails. Nothing is
    /// returned in that case, partial graphs are never flattened.
    pub async fn load(&self) -> Result<UsersPermissions, DomainError> {
        let (users, roles, global_roles, role_bindings, global_role_bindings) = tokio::try_join!(
            self.store.list_users(),
            self.store.list_roles(None),
            self.store.list_global_roles(),
            self.store.list_role_bindings(None),
            self.store.list_global_role_bindings(),
        )?;

        let graph = RoleGraph {
            users,
            roles,
            global_roles,
            role_bindings,
            global_role_bindings,
        };
        let index = graph.flatten();
        tracing::debug!(
            users = graph.users.len(),
            roles = graph.roles.len() + graph.global_roles.len(),
            bindings = graph.role_bindings.len() + graph.global_role_bindings.len(),
            indexed_users = index.len(),
            "role graph loaded"
        );
        Ok(index)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use rbac_resolver_sdk::{Action, Scope, Subject};

    use super::*;

    fn read_dashboard() -> Permission {
        Permission::new([Action::Read], [Scope::Dashboard])
    }

    fn role(project: &str, name: &str, permissions: Vec<Permission>) -> Role {
        Role {
            project: project.to_owned(),
            name: name.to_owned(),
            permissions,
        }
    }

    fn binding(project: &str, role: &str, users: &[&str]) -> RoleBinding {
        RoleBinding {
            project: project.to_owned(),
            name: format!("{role}-binding"),
            role: role.to_owned(),
            subjects: users.iter().map(|u| Subject::user(u)).collect(),
        }
    }

    #[test]
    fn global_bindings_land_under_wildcard() {
        let graph = RoleGraph {
            users: vec![User::new("admin")],
            global_roles: vec![GlobalRole {
                name: "admin".to_owned(),
                permissions: vec![Permission::all()],
            }],
            global_role_bindings: vec![GlobalRoleBinding {
                name: "admins".to_owned(),
                role: "admin".to_owned(),
                subjects: vec![Subject::user("admin")],
            }],
            ..RoleGraph::default()
        };

        let index = graph.flatten();
        assert_eq!(
            index.project_permissions("admin", WILDCARD_PROJECT),
            Some([Permission::all()].as_slice())
        );
    }

    #[test]
    fn project_bindings_accumulate() {
        let create_variable = Permission::new([Action::Create], [Scope::Variable]);
        let graph = RoleGraph {
            users: vec![User::new("user0")],
            roles: vec![
                role("project0", "viewer", vec![read_dashboard()]),
                role("project0", "editor", vec![create_variable.clone()]),
            ],
            role_bindings: vec![
                binding("project0", "viewer", &["user0"]),
                binding("project0", "editor", &["user0"]),
                binding("project0", "viewer", &["user0"]),
            ],
            ..RoleGraph::default()
        };

        let index = graph.flatten();
        assert_eq!(
            index.project_permissions("user0", "project0"),
            Some([read_dashboard(), create_variable, read_dashboard()].as_slice())
        );
    }

    #[test]
    fn role_is_resolved_in_the_binding_project() {
        let graph = RoleGraph {
            users: vec![User::new("user0")],
            roles: vec![role("project1", "viewer", vec![read_dashboard()])],
            role_bindings: vec![binding("project0", "viewer", &["user0"])],
            ..RoleGraph::default()
        };

        assert!(graph.flatten().get("user0").is_none());
    }

    #[test]
    fn dangling_reference_only_affects_its_binding() {
        let graph = RoleGraph {
            users: vec![User::new("user0"), User::new("user1")],
            roles: vec![role("project0", "viewer", vec![read_dashboard()])],
            role_bindings: vec![
                binding("project0", "ghost", &["user0"]),
                binding("project0", "viewer", &["user0", "user1"]),
            ],
            ..RoleGraph::default()
        };

        let index = graph.flatten();
        assert_eq!(
            index.project_permissions("user0", "project0"),
            Some([read_dashboard()].as_slice())
        );
        assert_eq!(
            index.project_permissions("user1", "project0"),
            Some([read_dashboard()].as_slice())
        );
    }

    #[test]
    fn bindings_for_other_users_are_ignored() {
        let graph = RoleGraph {
            users: vec![User::new("user0")],
            roles: vec![role("project0", "viewer", vec![read_dashboard()])],
            role_bindings: vec![binding("project0", "viewer", &["user1"])],
            ..RoleGraph::default()
        };

        assert!(graph.flatten().is_empty());
    }
}
