//! Configuration for the Kubernetes RBAC plugin.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_QPS: u32 = 500;
pub const DEFAULT_BURST: u32 = 1000;
pub const DEFAULT_ALLOW_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_DENY_TTL: Duration = Duration::from_secs(30);
pub const DEFAULT_AUTHENTICATOR_TTL: Duration = Duration::from_secs(2 * 60);

/// Plugin settings, mapped from the `provider.kubernetes` section by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct K8sRbacPluginConfig {
    /// Explicit kubeconfig. `None` uses the in-cluster service account.
    pub kubeconfig: Option<PathBuf>,
    pub qps: u32,
    pub burst: u32,
    pub authorizer_allow_ttl: Duration,
    pub authorizer_deny_ttl: Duration,
    pub authenticator_ttl: Duration,
}

impl Default for K8sRbacPluginConfig {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            qps: DEFAULT_QPS,
            burst: DEFAULT_BURST,
            authorizer_allow_ttl: DEFAULT_ALLOW_TTL,
            authorizer_deny_ttl: DEFAULT_DENY_TTL,
            authenticator_ttl: DEFAULT_AUTHENTICATOR_TTL,
        }
    }
}

impl K8sRbacPluginConfig {
    /// An empty path means in-cluster configuration.
    #[must_use]
    pub fn with_kubeconfig(mut self, path: &str) -> Self {
        self.kubeconfig = (!path.is_empty()).then(|| PathBuf::from(path));
        self
    }
}
