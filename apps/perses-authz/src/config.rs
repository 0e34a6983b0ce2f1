//! Application configuration: one YAML document overlaid with `PERSES_` variables.

use std::path::Path;

use anyhow::{Context, bail};
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use rbac_resolver::SecurityConfig;
use serde::Deserialize;
use static_rbac_plugin::StaticRbacPluginConfig;

pub const ENV_PREFIX: &str = "PERSES_";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub security: SecurityConfig,
    /// Role graph served to the local evaluator.
    pub static_rbac: StaticRbacPluginConfig,
}

impl AppConfig {
    /// Reads `path` when given, then applies `PERSES_SECTION__KEY=value` overrides.
    ///
    /// # Errors
    ///
    /// Missing file, malformed YAML or an unknown key.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        Self::figment(path)?
            .extract()
            .context("failed to load configuration")
    }

    fn figment(path: Option<&Path>) -> anyhow::Result<Figment> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            if !path.is_file() {
                bail!("configuration file {} does not exist", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }
}
