//! Domain layer for the RBAC resolver.

pub mod delegated;
pub mod disabled;
pub mod error;
pub mod facade;
pub mod loader;
pub mod local;

pub use delegated::DelegatedEvaluator;
pub use disabled::DisabledEvaluator;
pub use error::DomainError;
pub use facade::{Authorization, AuthorizationDeps};
pub use loader::{RoleGraph, RoleGraphLoader, UsersPermissions};
pub use local::LocalEvaluator;
