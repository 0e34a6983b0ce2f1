//! RBAC resolver bootstrap.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use rbac_resolver_sdk::AuthorizationClient;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::{DEFAULT_REFRESH_INTERVAL, SecurityConfig};
use crate::domain::{Authorization, AuthorizationDeps};

pub const MODULE_NAME: &str = "rbac-resolver";

/// Verifies the configuration and selects the backend.
///
/// # Errors
///
/// Invalid configuration, a missing collaborator or a failed initial refresh.
#[tracing::instrument(skip_all, fields(backend))]
pub async fn init(
    mut cfg: SecurityConfig,
    deps: AuthorizationDeps,
) -> anyhow::Result<Arc<Authorization>> {
    info!("Initializing {MODULE_NAME} module");
    cfg.verify().context("invalid security configuration")?;

    let authz = Authorization::from_config(&cfg, deps)
        .await
        .context("failed to select the authorization backend")?;
    tracing::Span::current().record("backend", authz.backend());

    info!(backend = authz.backend(), "{MODULE_NAME} module initialized successfully");
    Ok(Arc::new(authz))
}

/// Calls [`AuthorizationClient::refresh`] every `interval` until `cancel` fires.
/// Failures are logged and the previous index keeps serving.
pub fn spawn_periodic_refresh(
    client: Arc<dyn AuthorizationClient>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let interval = if interval.is_zero() {
        DEFAULT_REFRESH_INTERVAL
    } else {
        interval
    };
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately, init already refreshed.
        ticker.tick().await;
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::debug!("periodic refresh stopped");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(e) = client.refresh().await {
                        tracing::warn!(error = %e, "periodic permission refresh failed");
                    }
                }
            }
        }
    })
}
