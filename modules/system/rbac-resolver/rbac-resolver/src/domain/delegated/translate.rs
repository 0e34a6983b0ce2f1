//! Translation of Perses permission triples into Kubernetes authorization attributes.

use rbac_resolver_sdk::{AccessReview, Action, Scope, WILDCARD_PROJECT};

pub const PERSES_API_GROUP: &str = "perses.dev";
pub const PERSES_API_VERSION: &str = "v1alpha1";
const CORE_API_GROUP: &str = "";
const CORE_API_VERSION: &str = "v1";

/// Resource name plus API group/version on the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignResource {
    pub resource: &'static str,
    pub api_group: &'static str,
    pub api_version: &'static str,
}

impl ForeignResource {
    const fn perses(resource: &'static str) -> Self {
        Self {
            resource,
            api_group: PERSES_API_GROUP,
            api_version: PERSES_API_VERSION,
        }
    }
}

#[must_use]
pub fn verb(action: Action) -> &'static str {
    match action {
        Action::Read => "get",
        Action::Create => "create",
        Action::Update => "patch",
        Action::Delete => "delete",
        Action::Wildcard => "*",
    }
}

/// `None` for scopes the remote system does not manage.
#[must_use]
pub fn foreign_resource(scope: Scope) -> Option<ForeignResource> {
    match scope {
        Scope::Dashboard => Some(ForeignResource::perses("persesdashboards")),
        Scope::Datasource => Some(ForeignResource::perses("persesdatasources")),
        Scope::GlobalDatasource => Some(ForeignResource::perses("persesglobaldatasources")),
        Scope::Project => Some(ForeignResource {
            resource: "namespaces",
            api_group: CORE_API_GROUP,
            api_version: CORE_API_VERSION,
        }),
        Scope::Wildcard => Some(ForeignResource::perses("*")),
        Scope::Folder
        | Scope::GlobalRole
        | Scope::GlobalRoleBinding
        | Scope::GlobalSecret
        | Scope::GlobalVariable
        | Scope::Role
        | Scope::RoleBinding
        | Scope::Secret
        | Scope::User
        | Scope::Variable => None,
    }
}

/// Global scopes are always checked against the wildcard project.
#[must_use]
pub fn target_project(project: &str, scope: Scope) -> &str {
    if scope.is_global() {
        WILDCARD_PROJECT
    } else {
        project
    }
}

/// Builds the review for `identity`, or `None` when `scope` is not delegable.
#[must_use]
pub fn access_review(
    identity: &str,
    groups: &[String],
    action: Action,
    project: &str,
    scope: Scope,
) -> Option<AccessReview> {
    let foreign = foreign_resource(scope)?;
    Some(AccessReview {
        identity: identity.to_owned(),
        groups: groups.to_vec(),
        verb: verb(action).to_owned(),
        namespace: target_project(project, scope).to_owned(),
        api_group: foreign.api_group.to_owned(),
        api_version: foreign.api_version.to_owned(),
        resource: foreign.resource.to_owned(),
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn verbs() {
        let verbs: Vec<&str> = Action::ALL.into_iter().map(verb).collect();
        assert_eq!(verbs, vec!["get", "create", "patch", "delete", "*"]);
    }

    #[test]
    fn project_maps_to_core_namespaces() {
        let project = foreign_resource(Scope::Project).unwrap();
        assert_eq!(project.resource, "namespaces");
        assert_eq!(project.api_group, "");
        assert_eq!(project.api_version, "v1");

        let dashboard = foreign_resource(Scope::Dashboard).unwrap();
        assert_eq!(dashboard.api_group, PERSES_API_GROUP);
        assert_eq!(dashboard.api_version, PERSES_API_VERSION);
    }

    #[test]
    fn only_perses_resources_are_delegable() {
        let delegable: Vec<Scope> = Scope::ALL
            .into_iter()
            .filter(|s| foreign_resource(*s).is_some())
            .collect();
        assert_eq!(
            delegable,
            vec![
                Scope::Dashboard,
                Scope::Datasource,
                Scope::GlobalDatasource,
                Scope::Project,
                Scope::Wildcard,
            ]
        );
    }

    #[test]
    fn global_scope_ignores_requested_project() {
        let review = access_review(
            "user0",
            &[],
            Action::Read,
            "project0",
            Scope::GlobalDatasource,
        )
        .unwrap();
        assert_eq!(review.namespace, "*");
        assert_eq!(review.resource, "persesglobaldatasources");

        let review = access_review("user0", &[], Action::Update, "project0", Scope::Datasource).unwrap();
        assert_eq!(review.namespace, "project0");
        assert_eq!(review.verb, "patch");
    }

    #[test]
    fn non_delegable_scope_has_no_review() {
        assert!(access_review("user0", &[], Action::Read, "project0", Scope::Secret).is_none());
    }
}
