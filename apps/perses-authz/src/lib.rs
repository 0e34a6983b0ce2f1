#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Library side of the `perses-authz` binary: configuration loading, collaborator
//! wiring and the query commands.

mod backend;
pub mod cli;
pub mod config;

pub use cli::{Cli, Command};
pub use config::AppConfig;
