//! Collaborator wiring for the selected provider.

use std::sync::Arc;

use anyhow::Context;
use k8s_rbac_plugin::K8sRbacPluginConfig;
use rbac_resolver::config::KubernetesProviderConfig;
use rbac_resolver::{Authorization, AuthorizationDeps, SecurityConfig};
use rbac_resolver_sdk::{IdentityResolver, RoleStore};
use static_rbac_plugin::StaticRbacPluginConfig;

pub struct Backend {
    pub authz: Arc<Authorization>,
    /// Only the kubernetes provider resolves bearer tokens.
    pub identity: Option<Arc<dyn IdentityResolver>>,
}

/// The kubernetes provider gets the remote authorizer, every other setup gets the
/// static role store.
pub async fn connect(
    mut security: SecurityConfig,
    graph: StaticRbacPluginConfig,
) -> anyhow::Result<Backend> {
    security
        .verify()
        .context("invalid security configuration")?;

    let mut deps = AuthorizationDeps::default();
    let mut identity = None;
    let kubernetes = &security.authorization.provider.kubernetes;
    if security.enable_auth && kubernetes.enable {
        let service = k8s_rbac_plugin::module::connect(&plugin_config(kubernetes)).await?;
        let resolver: Arc<dyn IdentityResolver> = service.clone();
        identity = Some(resolver);
        deps.remote = Some(service);
    } else {
        let store: Arc<dyn RoleStore> = static_rbac_plugin::module::init(graph);
        deps.store = Some(store);
    }

    let authz = rbac_resolver::module::init(security, deps).await?;
    Ok(Backend { authz, identity })
}

fn plugin_config(provider: &KubernetesProviderConfig) -> K8sRbacPluginConfig {
    K8sRbacPluginConfig {
        kubeconfig: None,
        qps: provider.qps,
        burst: provider.burst,
        authorizer_allow_ttl: provider.authorizer_allow_ttl,
        authorizer_deny_ttl: provider.authorizer_deny_ttl,
        authenticator_ttl: provider.authenticator_ttl,
    }
    .with_kubeconfig(&provider.kubeconfig)
}
