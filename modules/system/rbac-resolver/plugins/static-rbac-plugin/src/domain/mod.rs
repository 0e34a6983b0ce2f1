//! Domain layer for the static RBAC plugin.

mod client;
pub mod service;

pub use service::Service;
