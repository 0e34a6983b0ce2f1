//! Configuration for the static RBAC plugin.

use rbac_resolver_sdk::{GlobalRole, GlobalRoleBinding, Role, RoleBinding, User};
use serde::Deserialize;

/// The whole role graph, as persisted entities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticRbacPluginConfig {
    pub users: Vec<User>,
    pub roles: Vec<Role>,
    pub global_roles: Vec<GlobalRole>,
    pub role_bindings: Vec<RoleBinding>,
    pub global_role_bindings: Vec<GlobalRoleBinding>,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use rbac_resolver_sdk::{Action, Permission, Scope, Subject};

    use super::*;

    #[test]
    fn parses_yaml() {
        let yaml = r#"
users:
  - name: user0
roles:
  - project: project0
    name: viewer
    permissions:
      - actions: [read]
        scopes: [Dashboard]
role_bindings:
  - project: project0
    name: viewers
    role: viewer
    subjects:
      - kind: User
        name: user0
"#;
        let cfg: StaticRbacPluginConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(cfg.users, vec![User::new("user0")]);
        assert_eq!(
            cfg.roles[0].permissions,
            vec![Permission::new([Action::Read], [Scope::Dashboard])]
        );
        assert_eq!(cfg.role_bindings[0].subjects, vec![Subject::user("user0")]);
        assert!(cfg.global_roles.is_empty());
        assert!(cfg.global_role_bindings.is_empty());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed: Result<StaticRbacPluginConfig, _> = serde_saphyr::from_str("groups: []\n");
        assert!(parsed.is_err());
    }
}
