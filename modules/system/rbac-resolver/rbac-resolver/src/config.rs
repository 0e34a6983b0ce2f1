//! Configuration for the RBAC resolver.

use std::time::Duration;

use rbac_resolver_sdk::Permission;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_KUBERNETES_QPS: u32 = 500;
pub const DEFAULT_KUBERNETES_BURST: u32 = 1000;
pub const DEFAULT_AUTHORIZER_ALLOW_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_AUTHORIZER_DENY_TTL: Duration = Duration::from_secs(30);
pub const DEFAULT_AUTHENTICATOR_TTL: Duration = Duration::from_secs(2 * 60);

/// `security` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityConfig {
    /// When `false` every permission check is skipped.
    pub enable_auth: bool,
    pub authorization: AuthorizationConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorizationConfig {
    /// Deprecated, use `provider.native.check_latest_update_interval`.
    #[serde(with = "duration_format", skip_serializing_if = "Duration::is_zero")]
    pub check_latest_update_interval: Duration,
    /// Deprecated, use `provider.native.guest_permissions`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub guest_permissions: Vec<Permission>,
    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    pub native: NativeProviderConfig,
    pub kubernetes: KubernetesProviderConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NativeProviderConfig {
    pub enable: bool,
    /// Period of the external refresh trigger.
    #[serde(with = "duration_format")]
    pub check_latest_update_interval: Duration,
    /// Granted to every authenticated identity.
    pub guest_permissions: Vec<Permission>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KubernetesProviderConfig {
    pub enable: bool,
    /// Local kubeconfig path. Development only, in-cluster configuration is used when empty.
    pub kubeconfig: String,
    pub qps: u32,
    pub burst: u32,
    #[serde(with = "duration_format")]
    pub authorizer_allow_ttl: Duration,
    #[serde(with = "duration_format")]
    pub authorizer_deny_ttl: Duration,
    #[serde(with = "duration_format")]
    pub authenticator_ttl: Duration,
}

impl SecurityConfig {
    /// Applies defaults, migrates deprecated fields and validates the result.
    ///
    /// # Errors
    ///
    /// `DomainError::InvalidConfig` when both providers are enabled or a guest
    /// permission is empty.
    pub fn verify(&mut self) -> Result<(), DomainError> {
        self.authorization.verify()
    }
}

impl AuthorizationConfig {
    fn verify(&mut self) -> Result<(), DomainError> {
        if !self.check_latest_update_interval.is_zero() {
            tracing::warn!(
                "'security.authorization.check_latest_update_interval' is deprecated, use 'security.authorization.provider.native.check_latest_update_interval' instead"
            );
            self.provider.native.check_latest_update_interval =
                std::mem::take(&mut self.check_latest_update_interval);
        }
        if !self.guest_permissions.is_empty() {
            tracing::warn!(
                "'security.authorization.guest_permissions' is deprecated, use 'security.authorization.provider.native.guest_permissions' instead"
            );
            self.provider.native.guest_permissions = std::mem::take(&mut self.guest_permissions);
        }

        if self.provider.native.enable && self.provider.kubernetes.enable {
            return Err(DomainError::InvalidConfig(
                "the native and kubernetes authorization providers cannot be enabled together"
                    .to_owned(),
            ));
        }

        self.provider.native.verify()?;
        self.provider.kubernetes.verify();
        Ok(())
    }
}

impl NativeProviderConfig {
    fn verify(&mut self) -> Result<(), DomainError> {
        if self.check_latest_update_interval.is_zero() {
            self.check_latest_update_interval = DEFAULT_REFRESH_INTERVAL;
        }
        for (i, permission) in self.guest_permissions.iter().enumerate() {
            permission.validate().map_err(|e| {
                DomainError::InvalidConfig(format!("guest_permissions[{i}]: {e}"))
            })?;
        }
        Ok(())
    }
}

impl KubernetesProviderConfig {
    fn verify(&mut self) {
        if !self.enable {
            return;
        }
        if !self.kubeconfig.is_empty() {
            tracing::warn!("kubeconfig present, this functionality should not be used in production");
        }
        if self.qps == 0 {
            self.qps = DEFAULT_KUBERNETES_QPS;
        }
        if self.burst == 0 {
            self.burst = DEFAULT_KUBERNETES_BURST;
        }
        if self.authorizer_allow_ttl.is_zero() {
            self.authorizer_allow_ttl = DEFAULT_AUTHORIZER_ALLOW_TTL;
        }
        if self.authorizer_deny_ttl.is_zero() {
            self.authorizer_deny_ttl = DEFAULT_AUTHORIZER_DENY_TTL;
        }
        if self.authenticator_ttl.is_zero() {
            self.authenticator_ttl = DEFAULT_AUTHENTICATOR_TTL;
        }
    }
}

/// Human readable durations (`30s`, `5m`, `1h 30m`).
pub mod duration_format {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    /// # Errors
    ///
    /// Propagates the serializer error.
    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*value))
    }

    /// # Errors
    ///
    /// Fails on anything `humantime` cannot parse.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
    }
}
