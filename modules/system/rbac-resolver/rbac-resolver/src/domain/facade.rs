//! Authorization facade: the one backend selected at startup.

use std::sync::Arc;

use async_trait::async_trait;
use perses_security::SecurityContext;
use rbac_resolver_sdk::{
    Action, AuthorizationClient, AuthorizationError, ProjectPermissions,
    RemoteAuthorizerPluginClient, RoleStore, Scope,
};

use super::{DelegatedEvaluator, DisabledEvaluator, DomainError, LocalEvaluator, RoleGraphLoader};
use crate::config::SecurityConfig;

/// Collaborators a backend may need. Only the one matching the configuration is required.
#[derive(Clone, Default)]
pub struct AuthorizationDeps {
    pub store: Option<Arc<dyn RoleStore>>,
    pub remote: Option<Arc<dyn RemoteAuthorizerPluginClient>>,
}

/// Closed set of backends behind [`AuthorizationClient`].
pub enum Authorization {
    Disabled(DisabledEvaluator),
    Local(LocalEvaluator),
    Delegated(DelegatedEvaluator),
}

impl Authorization {
    /// Selects the backend from a verified configuration. The local cache is
    /// refreshed once before it is returned.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` when the collaborator required by the configuration is missing
    /// - `Store` when the initial refresh of the local cache fails
    pub async fn from_config(
        cfg: &SecurityConfig,
        deps: AuthorizationDeps,
    ) -> Result<Self, DomainError> {
        if !cfg.enable_auth {
            tracing::info!(backend = "disabled", "authorization disabled");
            return Ok(Self::Disabled(DisabledEvaluator));
        }

        let provider = &cfg.authorization.provider;
        if provider.kubernetes.enable {
            let remote = deps.remote.ok_or_else(|| {
                DomainError::InvalidConfig(
                    "kubernetes authorization is enabled but no remote authorizer is available"
                        .to_owned(),
                )
            })?;
            tracing::info!(backend = "delegated", "authorization delegated to kubernetes");
            return Ok(Self::Delegated(DelegatedEvaluator::new(
                remote,
                provider.native.guest_permissions.clone(),
            )));
        }

        let store = deps.store.ok_or_else(|| {
            DomainError::InvalidConfig(
                "local authorization requires a role store".to_owned(),
            )
        })?;
        let local = LocalEvaluator::new(
            RoleGraphLoader::new(store),
            provider.native.guest_permissions.clone(),
        );
        local.refresh().await?;
        tracing::info!(backend = "local", "authorization served from the local permission cache");
        Ok(Self::Local(local))
    }

    #[must_use]
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Disabled(_) => "disabled",
            Self::Local(_) => "local",
            Self::Delegated(_) => "delegated",
        }
    }
}

fn log_and_convert(op: &str, e: DomainError) -> AuthorizationError {
    tracing::error!(operation = op, error = ?e, "rbac_resolver call failed");
    e.into()
}

#[async_trait]
impl AuthorizationClient for Authorization {
    fn is_enabled(&self) -> bool {
        match self {
            Self::Disabled(d) => d.is_enabled(),
            Self::Local(_) | Self::Delegated(_) => true,
        }
    }

    #[tracing::instrument(skip_all, fields(backend = self.backend(), %action, project, %scope))]
    async fn has_permission(
        &self,
        ctx: &SecurityContext,
        action: Action,
        project: &str,
        scope: Scope,
    ) -> bool {
        match self {
            Self::Disabled(d) => d.has_permission(ctx, action, project, scope).await,
            Self::Local(l) => l.has_permission(ctx, action, project, scope),
            Self::Delegated(r) => r.has_permission(ctx, action, project, scope).await,
        }
    }

    #[tracing::instrument(skip_all, fields(backend = self.backend(), %action, %scope))]
    async fn get_user_projects(
        &self,
        ctx: &SecurityContext,
        action: Action,
        scope: Scope,
    ) -> Result<Vec<String>, AuthorizationError> {
        match self {
            Self::Disabled(d) => d.get_user_projects(ctx, action, scope).await,
            Self::Local(l) => l
                .get_user_projects(ctx, action, scope)
                .map_err(|e| log_and_convert("get_user_projects", e)),
            Self::Delegated(r) => r
                .get_user_projects(ctx, action, scope)
                .await
                .map_err(|e| log_and_convert("get_user_projects", e)),
        }
    }

    #[tracing::instrument(skip_all, fields(backend = self.backend()))]
    async fn get_permissions(
        &self,
        ctx: &SecurityContext,
    ) -> Result<ProjectPermissions, AuthorizationError> {
        match self {
            Self::Disabled(d) => d.get_permissions(ctx).await,
            Self::Local(l) => l
                .get_permissions(ctx)
                .map_err(|e| log_and_convert("get_permissions", e)),
            Self::Delegated(r) => r
                .get_permissions(ctx)
                .await
                .map_err(|e| log_and_convert("get_permissions", e)),
        }
    }

    #[tracing::instrument(skip_all, fields(backend = self.backend()))]
    async fn refresh(&self) -> Result<(), AuthorizationError> {
        match self {
            Self::Local(l) => l.refresh().await.map_err(|e| log_and_convert("refresh", e)),
            Self::Disabled(_) | Self::Delegated(_) => Ok(()),
        }
    }
}
