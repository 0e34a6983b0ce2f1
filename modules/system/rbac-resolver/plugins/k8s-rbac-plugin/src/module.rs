//! Kubernetes RBAC plugin bootstrap.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use kube::Client;
use kube::config::{Config, KubeConfigOptions, Kubeconfig};
use tracing::info;

use crate::config::K8sRbacPluginConfig;
use crate::domain::Service;

pub const MODULE_NAME: &str = "k8s-rbac-plugin";

/// Builds the Kubernetes client and the service implementing both plugin traits.
///
/// # Errors
///
/// Unreadable kubeconfig, missing in-cluster service account or invalid rate limits.
pub async fn connect(cfg: &K8sRbacPluginConfig) -> anyhow::Result<Arc<Service>> {
    info!("Initializing {MODULE_NAME}");

    let client = create_client(cfg.kubeconfig.as_deref()).await?;
    let service = Service::new(client, cfg)?;

    info!(
        qps = cfg.qps,
        burst = cfg.burst,
        in_cluster = cfg.kubeconfig.is_none(),
        "{MODULE_NAME} initialized"
    );
    Ok(Arc::new(service))
}

/// Explicit kubeconfig for local usage, the pod service account otherwise.
async fn create_client(kubeconfig: Option<&Path>) -> anyhow::Result<Client> {
    let config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)
                .with_context(|| format!("failed to read kubeconfig {}", path.display()))?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .context("failed to load kubeconfig")?
        }
        None => Config::incluster()
            .context("cannot find service account in pod to build in-cluster config")?,
    };
    Client::try_from(config).context("failed to create kubernetes client")
}
