//! Static RBAC plugin bootstrap.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::StaticRbacPluginConfig;
use crate::domain::Service;

pub const MODULE_NAME: &str = "static-rbac-plugin";

/// Builds the store. Invalid bindings are reported but kept; the loader skips them.
#[must_use]
pub fn init(cfg: StaticRbacPluginConfig) -> Arc<Service> {
    info!("Initializing {MODULE_NAME}");

    for binding in &cfg.role_bindings {
        if let Err(e) = binding.validate_role_reference(&cfg.roles) {
            warn!(project = %binding.project, binding = %binding.name, error = %e, "invalid role binding");
        }
    }
    for binding in &cfg.global_role_bindings {
        if let Err(e) = binding.validate_role_reference(&cfg.global_roles) {
            warn!(binding = %binding.name, error = %e, "invalid global role binding");
        }
    }

    info!(
        users = cfg.users.len(),
        roles = cfg.roles.len(),
        global_roles = cfg.global_roles.len(),
        role_bindings = cfg.role_bindings.len(),
        global_role_bindings = cfg.global_role_bindings.len(),
        "{MODULE_NAME} initialized"
    );
    Arc::new(Service::new(cfg))
}
