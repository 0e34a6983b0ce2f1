#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! RBAC Resolver SDK
//!
//! This crate provides the public API for the `rbac_resolver` module:
//!
//! - [`Action`], [`Scope`], [`Permission`] - Permission model and [`permission_set_grants`]
//! - [`Role`], [`GlobalRole`], [`RoleBinding`], [`GlobalRoleBinding`], [`User`] - Role graph entities
//! - [`AuthorizationClient`] - Facade contract consumed by CRUD services and the proxy
//! - [`RoleStore`] - Persistence collaborator consumed by the role graph loader
//! - [`RemoteAuthorizerPluginClient`], [`IdentityResolver`] - Delegated backend plugin API
//! - [`AuthorizationError`], [`StoreError`], [`ValidationError`] - Error types
//! - [`pep`] - Enforcement helper for CRUD services
//!
//! ## Usage
//!
//! ```ignore
//! use rbac_resolver_sdk::{pep, Action, AuthorizationClient, Scope};
//!
//! // Before any mutation
//! pep::enforce(authz.as_ref(), &ctx, Action::Create, "project0", Scope::Dashboard).await?;
//!
//! // After a Role/RoleBinding mutation
//! authz.refresh().await?;
//! ```

pub mod api;
pub mod error;
pub mod models;
pub mod pep;
pub mod permission;
pub mod plugin_api;
pub mod store;

// Re-export main types at crate root
pub use api::AuthorizationClient;
pub use error::{AuthorizationError, StoreError, ValidationError};
pub use models::{GlobalRole, GlobalRoleBinding, Role, RoleBinding, Subject, SubjectKind, User};
pub use permission::{
    Action, Permission, ProjectPermissions, Scope, WILDCARD_PROJECT, permission_set_grants,
};
pub use plugin_api::{
    AccessReview, Decision, IdentityResolver, RemoteAuthorizerPluginClient, ReviewResponse,
};
pub use store::RoleStore;
