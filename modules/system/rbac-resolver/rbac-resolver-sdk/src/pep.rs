//! Policy enforcement helper for CRUD services.

use perses_security::SecurityContext;

use crate::api::AuthorizationClient;
use crate::error::AuthorizationError;
use crate::permission::{Action, Scope};

/// Gate a CRUD operation.
///
/// Disabled authorization skips the check entirely, anonymous callers included.
///
/// # Errors
///
/// [`AuthorizationError::Forbidden`] when the permission is not granted. Backend
/// failures are indistinguishable from denials.
pub async fn enforce(
    client: &dyn AuthorizationClient,
    ctx: &SecurityContext,
    action: Action,
    project: &str,
    scope: Scope,
) -> Result<(), AuthorizationError> {
    if !client.is_enabled() {
        return Ok(());
    }
    if client.has_permission(ctx, action, project, scope).await {
        return Ok(());
    }
    tracing::debug!(
        user = ctx.username().unwrap_or_default(),
        %action,
        project,
        %scope,
        "permission denied"
    );
    Err(AuthorizationError::Forbidden)
}
