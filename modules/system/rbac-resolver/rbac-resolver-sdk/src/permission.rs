//! Permission model: actions, scopes and the grant predicate shared by every evaluator.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Name of the synthetic project holding permissions granted across every project.
pub const WILDCARD_PROJECT: &str = "*";

/// Per-project permissions of one identity. The [`WILDCARD_PROJECT`] key holds
/// permissions that apply to every project.
pub type ProjectPermissions = HashMap<String, Vec<Permission>>;

/// Operation kind requested against a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Action {
    #[serde(rename = "read")]
    Read,
    #[serde(rename = "create")]
    Create,
    #[serde(rename = "update")]
    Update,
    #[serde(rename = "delete")]
    Delete,
    /// Matches any requested action.
    #[serde(rename = "*")]
    Wildcard,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Read,
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::Wildcard,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Wildcard => "*",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ValidationError;

    /// Parses an action name, not case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::UnknownAction(s.to_owned()))
    }
}

impl TryFrom<String> for Action {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Resource kind protected by a permission.
///
/// Scopes are partitioned into global scopes, which are not bound to a project,
/// and project scopes. `Project` itself is a project scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Scope {
    Dashboard,
    Datasource,
    Folder,
    GlobalDatasource,
    GlobalRole,
    GlobalRoleBinding,
    GlobalSecret,
    GlobalVariable,
    Project,
    Role,
    RoleBinding,
    Secret,
    User,
    Variable,
    #[serde(rename = "*")]
    Wildcard,
}

impl Scope {
    pub const ALL: [Scope; 15] = [
        Scope::Dashboard,
        Scope::Datasource,
        Scope::Folder,
        Scope::GlobalDatasource,
        Scope::GlobalRole,
        Scope::GlobalRoleBinding,
        Scope::GlobalSecret,
        Scope::GlobalVariable,
        Scope::Project,
        Scope::Role,
        Scope::RoleBinding,
        Scope::Secret,
        Scope::User,
        Scope::Variable,
        Scope::Wildcard,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Dashboard => "Dashboard",
            Scope::Datasource => "Datasource",
            Scope::Folder => "Folder",
            Scope::GlobalDatasource => "GlobalDatasource",
            Scope::GlobalRole => "GlobalRole",
            Scope::GlobalRoleBinding => "GlobalRoleBinding",
            Scope::GlobalSecret => "GlobalSecret",
            Scope::GlobalVariable => "GlobalVariable",
            Scope::Project => "Project",
            Scope::Role => "Role",
            Scope::RoleBinding => "RoleBinding",
            Scope::Secret => "Secret",
            Scope::User => "User",
            Scope::Variable => "Variable",
            Scope::Wildcard => "*",
        }
    }

    /// Whether the scope is independent of any project.
    #[must_use]
    pub fn is_global(self) -> bool {
        matches!(
            self,
            Scope::GlobalDatasource
                | Scope::GlobalRole
                | Scope::GlobalRoleBinding
                | Scope::GlobalSecret
                | Scope::GlobalVariable
                | Scope::User
        )
    }

    #[must_use]
    pub fn is_project_scoped(self) -> bool {
        self != Scope::Wildcard && !self.is_global()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = ValidationError;

    /// Parses a scope name, not case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scope::ALL
            .into_iter()
            .find(|scope| scope.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::UnknownScope(s.to_owned()))
    }
}

impl TryFrom<String> for Scope {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Grants the cross-product of its actions and scopes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub actions: Vec<Action>,
    pub scopes: Vec<Scope>,
}

impl Permission {
    #[must_use]
    pub fn new(actions: impl Into<Vec<Action>>, scopes: impl Into<Vec<Scope>>) -> Self {
        Self {
            actions: actions.into(),
            scopes: scopes.into(),
        }
    }

    /// `{actions: [*], scopes: [*]}`
    #[must_use]
    pub fn all() -> Self {
        Self::new([Action::Wildcard], [Scope::Wildcard])
    }

    /// Whether this permission covers `action` on `scope`.
    #[must_use]
    pub fn grants(&self, action: Action, scope: Scope) -> bool {
        let action_matches = self
            .actions
            .iter()
            .any(|a| *a == action || *a == Action::Wildcard);
        action_matches
            && self
                .scopes
                .iter()
                .any(|s| *s == scope || *s == Scope::Wildcard)
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyPermission`] when either set is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.actions.is_empty() || self.scopes.is_empty() {
            return Err(ValidationError::EmptyPermission);
        }
        Ok(())
    }
}

/// True iff some permission in `permissions` has `action` (or `*`) among its actions
/// and `scope` (or `*`) among its scopes.
#[must_use]
pub fn permission_set_grants(permissions: &[Permission], action: Action, scope: Scope) -> bool {
    permissions.iter().any(|p| p.grants(action, scope))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn exact_action_exact_scope() {
        let perms = vec![Permission::new([Action::Read], [Scope::Dashboard])];
        assert!(permission_set_grants(&perms, Action::Read, Scope::Dashboard));
        assert!(!permission_set_grants(&perms, Action::Create, Scope::Dashboard));
        assert!(!permission_set_grants(&perms, Action::Read, Scope::Datasource));
    }

    #[test]
    fn wildcard_action_exact_scope() {
        let perms = vec![Permission::new([Action::Wildcard], [Scope::Dashboard])];
        for action in Action::ALL {
            assert!(permission_set_grants(&perms, action, Scope::Dashboard));
        }
        assert!(!permission_set_grants(&perms, Action::Read, Scope::Secret));
    }

    #[test]
    fn exact_action_wildcard_scope() {
        let perms = vec![Permission::new([Action::Create], [Scope::Wildcard])];
        for scope in Scope::ALL {
            assert!(permission_set_grants(&perms, Action::Create, scope));
        }
        assert!(!permission_set_grants(&perms, Action::Delete, Scope::Variable));
    }

    #[test]
    fn wildcard_action_wildcard_scope() {
        let perms = vec![Permission::all()];
        for action in Action::ALL {
            for scope in Scope::ALL {
                assert!(permission_set_grants(&perms, action, scope));
            }
        }
    }

    #[test]
    fn empty_set_grants_nothing() {
        assert!(!permission_set_grants(&[], Action::Read, Scope::Dashboard));
    }

    #[test]
    fn action_and_scope_must_match_in_the_same_permission() {
        let perms = vec![
            Permission::new([Action::Read], [Scope::Dashboard]),
            Permission::new([Action::Create], [Scope::Variable]),
        ];
        assert!(!permission_set_grants(&perms, Action::Create, Scope::Dashboard));
        assert!(permission_set_grants(&perms, Action::Create, Scope::Variable));
    }

    #[test]
    fn validate_rejects_empty_sets() {
        assert!(Permission::new([], [Scope::Dashboard]).validate().is_err());
        assert!(Permission::new([Action::Read], []).validate().is_err());
        assert!(Permission::all().validate().is_ok());
    }

    #[test]
    fn global_scope_partition() {
        let global: Vec<Scope> = Scope::ALL.into_iter().filter(|s| s.is_global()).collect();
        assert_eq!(
            global,
            vec![
                Scope::GlobalDatasource,
                Scope::GlobalRole,
                Scope::GlobalRoleBinding,
                Scope::GlobalSecret,
                Scope::GlobalVariable,
                Scope::User,
            ]
        );
        assert!(Scope::Project.is_project_scoped());
        assert!(!Scope::Wildcard.is_project_scoped());
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("READ".parse::<Action>().unwrap(), Action::Read);
        assert_eq!("*".parse::<Action>().unwrap(), Action::Wildcard);
        assert_eq!("dashboard".parse::<Scope>().unwrap(), Scope::Dashboard);
        assert_eq!("globalRoleBinding".parse::<Scope>().unwrap(), Scope::GlobalRoleBinding);
        assert!(matches!(
            "list".parse::<Action>(),
            Err(ValidationError::UnknownAction(_))
        ));
        assert!(matches!(
            "Dashboards".parse::<Scope>(),
            Err(ValidationError::UnknownScope(_))
        ));
    }

    #[test]
    fn serde_uses_canonical_names() {
        let perm = Permission::new([Action::Read, Action::Wildcard], [Scope::Dashboard, Scope::Wildcard]);
        let json = serde_json::to_value(&perm).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"actions": ["read", "*"], "scopes": ["Dashboard", "*"]})
        );

        let parsed: Permission =
            serde_json::from_str(r#"{"actions":["Update"],"scopes":["variable"]}"#).unwrap();
        assert_eq!(parsed, Permission::new([Action::Update], [Scope::Variable]));
    }
}
