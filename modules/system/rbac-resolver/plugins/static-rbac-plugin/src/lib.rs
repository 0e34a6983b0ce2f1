#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static RBAC Resolver Plugin
//!
//! Read-only [`rbac_resolver_sdk::RoleStore`] backed by configuration, for development,
//! tests and the CLI. `list_roles` and `list_role_bindings` filter by project when one
//! is given.
//!
//! ## Configuration
//!
//! ```yaml
//! static_rbac:
//!   users:
//!     - name: admin
//!   global_roles:
//!     - name: admin
//!       permissions:
//!         - actions: ["*"]
//!           scopes: ["*"]
//!   global_role_bindings:
//!     - name: admins
//!       role: admin
//!       subjects:
//!         - kind: User
//!           name: admin
//! ```

pub mod config;
pub mod domain;
pub mod module;

pub use config::StaticRbacPluginConfig;
pub use domain::Service;
