#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Kubernetes RBAC Resolver Plugin
//!
//! Transport for the delegated evaluator. Every Perses permission question becomes a
//! `SubjectAccessReview`, projects are the cluster namespaces and bearer tokens are
//! resolved with a `TokenReview`.
//!
//! ## Behavior
//!
//! - `allowed` → `Allow`, `denied` → `Deny`, anything else → `NoOpinion`
//! - The wildcard project is reviewed in all namespaces (empty namespace)
//! - Allow answers are cached for `authorizer_allow_ttl`, other answers for
//!   `authorizer_deny_ttl`; failures are never cached
//! - Every API round trip goes through a client-side QPS/burst limiter
//! - Both caches are bounded; resolved tokens are cached under their SHA-256 digest
//!
//! ## Configuration
//!
//! ```yaml
//! security:
//!   authorization:
//!     provider:
//!       kubernetes:
//!         enable: true
//!         kubeconfig: ""   # in-cluster service account when empty
//!         qps: 500
//!         burst: 1000
//!         authorizer_allow_ttl: 5m
//!         authorizer_deny_ttl: 30s
//!         authenticator_ttl: 2m
//! ```

pub mod config;
pub mod domain;
pub mod module;

pub use config::K8sRbacPluginConfig;
pub use domain::Service;
