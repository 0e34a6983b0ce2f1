//! RBAC Resolver Module
//!
//! Builds the per-user permission index from the role store, answers permission
//! queries locally or by delegating them to a remote authorizer, and exposes one
//! [`Authorization`] facade selected from configuration.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod module;

pub use config::SecurityConfig;
pub use domain::{Authorization, AuthorizationDeps, DomainError};
