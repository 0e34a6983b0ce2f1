//! Delegated evaluator: forwards every decision to a remote authorizer.

mod discovery;
#[cfg(test)]
mod testing;
pub mod translate;

use std::future::Future;
use std::sync::Arc;

use perses_security::SecurityContext;
use rbac_resolver_sdk::{
    AccessReview, Action, AuthorizationError, Decision, Permission, RemoteAuthorizerPluginClient,
    Scope, WILDCARD_PROJECT, permission_set_grants,
};

pub use discovery::DISCOVERABLE_SCOPES;

use super::DomainError;

/// Scopes whose readability makes a project visible.
pub const VISIBILITY_SCOPES: [Scope; 2] = [Scope::Dashboard, Scope::Datasource];

/// Stateless per call. Caching and TTLs belong to the remote side.
pub struct DelegatedEvaluator {
    remote: Arc<dyn RemoteAuthorizerPluginClient>,
    guest_permissions: Vec<Permission>,
}

impl DelegatedEvaluator {
    /// `guest_permissions` answer the scopes the remote system does not manage.
    #[must_use]
    pub fn new(
        remote: Arc<dyn RemoteAuthorizerPluginClient>,
        guest_permissions: Vec<Permission>,
    ) -> Self {
        Self {
            remote,
            guest_permissions,
        }
    }

    /// Single decision. Any failure is a deny.
    pub async fn has_permission(
        &self,
        ctx: &SecurityContext,
        action: Action,
        project: &str,
        scope: Scope,
    ) -> bool {
        let Some(username) = ctx.username() else {
            return true;
        };
        let Some(review) = translate::access_review(username, ctx.groups(), action, project, scope)
        else {
            return permission_set_grants(&self.guest_permissions, action, scope);
        };

        match self.decide(ctx, &review).await {
            Ok(decision) => decision.is_allowed(),
            Err(e) => {
                tracing::warn!(
                    user = username,
                    %action,
                    project,
                    %scope,
                    error = %e,
                    "remote authorization failed, denying"
                );
                false
            }
        }
    }

    /// `*` followed by every remote project in which the caller can read a
    /// dashboard or a datasource. The requested action and scope do not narrow
    /// the answer, the question is whether the project is visible at all.
    ///
    /// # Errors
    ///
    /// - `IdentityRequired` for an anonymous context
    /// - `Transport` when the project listing fails
    /// - `Cancelled` when the request is aborted
    pub async fn get_user_projects(
        &self,
        ctx: &SecurityContext,
        action: Action,
        scope: Scope,
    ) -> Result<Vec<String>, DomainError> {
        let username = ctx
            .username()
            .ok_or_else(|| DomainError::identity_required("get_user_projects"))?;
        tracing::debug!(user = username, %action, %scope, "resolving visible projects");

        let projects = self.list_projects(ctx).await?;
        let mut visible = Vec::new();
        for project in std::iter::once(WILDCARD_PROJECT.to_owned()).chain(projects) {
            if self.project_visible(ctx, username, &project).await? {
                visible.push(project);
            }
        }
        Ok(visible)
    }

    async fn project_visible(
        &self,
        ctx: &SecurityContext,
        username: &str,
        project: &str,
    ) -> Result<bool, DomainError> {
        for scope in VISIBILITY_SCOPES {
            let Some(review) =
                translate::access_review(username, ctx.groups(), Action::Read, project, scope)
            else {
                continue;
            };
            match self.decide(ctx, &review).await {
                Ok(Decision::Allow) => return Ok(true),
                Ok(Decision::Deny | Decision::NoOpinion) => {}
                Err(DomainError::Cancelled) => return Err(DomainError::Cancelled),
                Err(e) => {
                    tracing::warn!(project, %scope, error = %e, "visibility check failed");
                }
            }
        }
        Ok(false)
    }

    /// Concrete projects known to the remote system, the wildcard excluded.
    async fn list_projects(&self, ctx: &SecurityContext) -> Result<Vec<String>, DomainError> {
        let mut projects = until_cancelled(ctx, self.remote.list_projects()).await?;
        projects.retain(|p| p != WILDCARD_PROJECT);
        Ok(projects)
    }

    /// One remote round trip.
    async fn decide(
        &self,
        ctx: &SecurityContext,
        review: &AccessReview,
    ) -> Result<Decision, DomainError> {
        let response = until_cancelled(ctx, self.remote.authorize(review)).await?;
        Ok(response.decision)
    }
}

/// Races `call` against the request's cancellation token. A token cancelled
/// before the call starts prevents the call entirely.
async fn until_cancelled<T>(
    ctx: &SecurityContext,
    call: impl Future<Output = Result<T, AuthorizationError>>,
) -> Result<T, DomainError> {
    let token = ctx.cancellation();
    if token.is_cancelled() {
        return Err(DomainError::Cancelled);
    }
    tokio::select! {
        biased;
        () = token.cancelled() => Err(DomainError::Cancelled),
        result = call => result.map_err(DomainError::from),
    }
}
