//! Bulk permission discovery against the remote authorizer.
//!
//! A first pass resolves every discoverable scope at the wildcard project. A
//! second pass walks each concrete project for the project scopes the first pass
//! left open, skipping actions already granted globally. Within one
//! (project, scope) the candidates are checked in the order `*`, read, create,
//! update, delete and the walk stops as soon as the answer cannot change.

use perses_security::SecurityContext;
use rbac_resolver_sdk::{Action, Decision, Permission, ProjectPermissions, Scope, WILDCARD_PROJECT};

use super::{DelegatedEvaluator, translate};
use crate::domain::DomainError;

/// Scopes enumerated by discovery.
pub const DISCOVERABLE_SCOPES: [Scope; 3] =
    [Scope::Dashboard, Scope::Datasource, Scope::GlobalDatasource];

const CANDIDATE_ACTIONS: [Action; 5] = [
    Action::Wildcard,
    Action::Read,
    Action::Create,
    Action::Update,
    Action::Delete,
];

const CONCRETE_ACTIONS: [Action; 4] = [Action::Read, Action::Create, Action::Update, Action::Delete];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Halt {
    /// The failing scope is abandoned for every later project.
    Transport,
    /// Every remaining round trip is abandoned.
    Cancelled,
}

#[derive(Debug, Default)]
struct ScopeDiscovery {
    granted: Vec<Action>,
    halt: Option<Halt>,
}

/// Project scope still to be walked per project.
struct OpenScope {
    scope: Scope,
    known: Vec<Action>,
    aborted: bool,
}

fn candidates(known: &[Action]) -> impl Iterator<Item = Action> + '_ {
    CANDIDATE_ACTIONS
        .into_iter()
        .filter(move |action| !known.contains(action))
}

/// `*` granted: no finer action adds information.
fn wildcard_settles(action: Action, decision: Decision) -> bool {
    action == Action::Wildcard && decision.is_allowed()
}

/// Read not granted: create, update and delete are not surfaced without it.
fn read_refused(action: Action, decision: Decision) -> bool {
    action == Action::Read && !decision.is_allowed()
}

/// The wildcard project answer already covers every project.
fn settled_globally(granted: &[Action]) -> bool {
    granted.contains(&Action::Wildcard) || CONCRETE_ACTIONS.iter().all(|a| granted.contains(a))
}

fn record(permissions: &mut ProjectPermissions, project: &str, scope: Scope, granted: &[Action]) {
    if granted.is_empty() {
        return;
    }
    permissions
        .entry(project.to_owned())
        .or_default()
        .push(Permission::new(granted, [scope]));
}

impl DelegatedEvaluator {
    /// Every permission the remote authorizer grants the caller on the
    /// discoverable scopes. Transport failures and cancellation truncate the
    /// result instead of failing it.
    ///
    /// # Errors
    ///
    /// `IdentityRequired` for an anonymous context.
    pub async fn get_permissions(
        &self,
        ctx: &SecurityContext,
    ) -> Result<ProjectPermissions, DomainError> {
        let username = ctx
            .username()
            .ok_or_else(|| DomainError::identity_required("get_permissions"))?;

        let mut permissions = ProjectPermissions::new();
        let mut open = Vec::new();
        for scope in DISCOVERABLE_SCOPES {
            let found = self
                .discover_actions(ctx, username, WILDCARD_PROJECT, scope, &[])
                .await;
            record(&mut permissions, WILDCARD_PROJECT, scope, &found.granted);
            let aborted = match found.halt {
                Some(Halt::Cancelled) => {
                    tracing::warn!(user = username, "permission discovery cancelled");
                    return Ok(permissions);
                }
                Some(Halt::Transport) => true,
                None => false,
            };
            if !aborted && scope.is_project_scoped() && !settled_globally(&found.granted) {
                open.push(OpenScope {
                    scope,
                    known: found.granted,
                    aborted: false,
                });
            }
        }
        if open.is_empty() {
            return Ok(permissions);
        }

        let projects = match self.list_projects(ctx).await {
            Ok(projects) => projects,
            Err(e) => {
                tracing::warn!(
                    user = username,
                    error = %e,
                    "project listing failed, returning global permissions only"
                );
                return Ok(permissions);
            }
        };

        for project in &projects {
            for entry in open.iter_mut().filter(|entry| !entry.aborted) {
                let found = self
                    .discover_actions(ctx, username, project, entry.scope, &entry.known)
                    .await;
                record(&mut permissions, project, entry.scope, &found.granted);
                match found.halt {
                    Some(Halt::Cancelled) => {
                        tracing::warn!(user = username, project, "permission discovery cancelled");
                        return Ok(permissions);
                    }
                    Some(Halt::Transport) => entry.aborted = true,
                    None => {}
                }
            }
            if open.iter().all(|entry| entry.aborted) {
                break;
            }
        }
        Ok(permissions)
    }

    async fn discover_actions(
        &self,
        ctx: &SecurityContext,
        username: &str,
        project: &str,
        scope: Scope,
        known: &[Action],
    ) -> ScopeDiscovery {
        let mut found = ScopeDiscovery::default();
        for action in candidates(known) {
            let Some(review) =
                translate::access_review(username, ctx.groups(), action, project, scope)
            else {
                break;
            };
            let decision = match self.decide(ctx, &review).await {
                Ok(decision) => decision,
                Err(DomainError::Cancelled) => {
                    found.halt = Some(Halt::Cancelled);
                    break;
                }
                Err(e) => {
                    tracing::warn!(
                        user = username,
                        project,
                        %scope,
                        %action,
                        error = %e,
                        "remote authorization failed, abandoning scope discovery"
                    );
                    found.halt = Some(Halt::Transport);
                    break;
                }
            };
            if decision.is_allowed() {
                found.granted.push(action);
            }
            if wildcard_settles(action, decision) || read_refused(action, decision) {
                break;
            }
        }
        found
    }
}
