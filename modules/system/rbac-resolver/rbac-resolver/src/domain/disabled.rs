//! Evaluator used when authorization is turned off.

use async_trait::async_trait;
use perses_security::SecurityContext;
use rbac_resolver_sdk::{Action, AuthorizationClient, AuthorizationError, ProjectPermissions, Scope};

/// Grants everything and enumerates nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledEvaluator;

#[async_trait]
impl AuthorizationClient for DisabledEvaluator {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn has_permission(
        &self,
        _ctx: &SecurityContext,
        _action: Action,
        _project: &str,
        _scope: Scope,
    ) -> bool {
        true
    }

    async fn get_user_projects(
        &self,
        _ctx: &SecurityContext,
        _action: Action,
        _scope: Scope,
    ) -> Result<Vec<String>, AuthorizationError> {
        Ok(Vec::new())
    }

    async fn get_permissions(
        &self,
        _ctx: &SecurityContext,
    ) -> Result<ProjectPermissions, AuthorizationError> {
        Ok(ProjectPermissions::new())
    }

    async fn refresh(&self) -> Result<(), AuthorizationError> {
        Ok(())
    }
}
