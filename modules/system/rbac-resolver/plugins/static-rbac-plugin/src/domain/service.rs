//! In-memory role graph served by the static plugin.

use parking_lot::RwLock;
use rbac_resolver_sdk::{GlobalRole, GlobalRoleBinding, Role, RoleBinding, User};

use crate::config::StaticRbacPluginConfig;

/// Holds the configured graph. [`Service::replace`] swaps it whole, so a concurrent
/// reader sees either the old or the new graph.
#[derive(Default)]
pub struct Service {
    graph: RwLock<StaticRbacPluginConfig>,
}

impl Service {
    #[must_use]
    pub fn new(graph: StaticRbacPluginConfig) -> Self {
        Self {
            graph: RwLock::new(graph),
        }
    }

    /// Installs a new graph. Callers refresh the authorization facade afterwards.
    pub fn replace(&self, graph: StaticRbacPluginConfig) {
        *self.graph.write() = graph;
    }

    #[must_use]
    pub fn users(&self) -> Vec<User> {
        self.graph.read().users.clone()
    }

    #[must_use]
    pub fn roles(&self, project: Option<&str>) -> Vec<Role> {
        self.graph
            .read()
            .roles
            .iter()
            .filter(|r| in_project(project, &r.project))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn global_roles(&self) -> Vec<GlobalRole> {
        self.graph.read().global_roles.clone()
    }

    #[must_use]
    pub fn role_bindings(&self, project: Option<&str>) -> Vec<RoleBinding> {
        self.graph
            .read()
            .role_bindings
            .iter()
            .filter(|b| in_project(project, &b.project))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn global_role_bindings(&self) -> Vec<GlobalRoleBinding> {
        self.graph.read().global_role_bindings.clone()
    }
}

fn in_project(filter: Option<&str>, project: &str) -> bool {
    filter.is_none_or(|p| p == project)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use rbac_resolver_sdk::Subject;

    use super::*;

    fn role(project: &str, name: &str) -> Role {
        Role {
            project: project.to_owned(),
            name: name.to_owned(),
            permissions: vec![],
        }
    }

    fn binding(project: &str, name: &str, role: &str) -> RoleBinding {
        RoleBinding {
            project: project.to_owned(),
            name: name.to_owned(),
            role: role.to_owned(),
            subjects: vec![Subject::user("user0")],
        }
    }

    fn service() -> Service {
        Service::new(StaticRbacPluginConfig {
            roles: vec![role("p0", "viewer"), role("p1", "viewer"), role("p1", "editor")],
            role_bindings: vec![binding("p0", "viewers", "viewer"), binding("p1", "editors", "editor")],
            ..StaticRbacPluginConfig::default()
        })
    }

    #[test]
    fn project_filter_narrows_roles_and_bindings() {
        let service = service();
        assert_eq!(service.roles(None).len(), 3);
        assert_eq!(service.roles(Some("p1")).len(), 2);
        assert!(service.roles(Some("p9")).is_empty());

        let bindings = service.role_bindings(Some("p0"));
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].name, "viewers");
        assert_eq!(service.role_bindings(None).len(), 2);
    }

    #[test]
    fn replace_swaps_the_whole_graph() {
        let service = service();
        service.replace(StaticRbacPluginConfig {
            users: vec![User::new("user9")],
            ..StaticRbacPluginConfig::default()
        });
        assert_eq!(service.users(), vec![User::new("user9")]);
        assert!(service.roles(None).is_empty());
        assert!(service.role_bindings(None).is_empty());
    }
}
