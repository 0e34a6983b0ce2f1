//! Command line surface.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use perses_security::SecurityContext;
use rbac_resolver_sdk::{Action, AuthorizationClient, IdentityResolver, Scope, WILDCARD_PROJECT};
use serde_json::{Value, json};

use crate::backend;
use crate::config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "perses-authz", version, about = "Query the Perses authorization engine")]
pub struct Cli {
    /// YAML configuration file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Caller login, anonymous when omitted
    #[arg(long, global = true, conflicts_with = "token")]
    pub user: Option<String>,

    /// Group of the caller, forwarded to the remote authorizer (repeatable)
    #[arg(long = "group", global = true)]
    pub groups: Vec<String>,

    /// Bearer token resolved through the kubernetes provider
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check a single permission, prints `{"allowed": bool}`
    Check {
        #[arg(long)]
        action: Action,
        #[arg(long, default_value = WILDCARD_PROJECT)]
        project: String,
        #[arg(long)]
        scope: Scope,
    },
    /// List the projects in which the caller holds the permission
    Projects {
        #[arg(long)]
        action: Action,
        #[arg(long)]
        scope: Scope,
    },
    /// Dump the caller's permissions grouped by project
    Permissions,
}

impl Cli {
    /// Loads the configuration, selects the backend and writes the JSON answer to `out`.
    ///
    /// # Errors
    ///
    /// Configuration, wiring, identity resolution or enumeration failures.
    pub async fn run(self, out: &mut impl Write) -> anyhow::Result<()> {
        let cfg = AppConfig::load(self.config.as_deref())?;
        let backend = backend::connect(cfg.security, cfg.static_rbac).await?;
        let ctx = self.security_context(backend.identity.as_deref()).await?;
        tracing::debug!(
            user = ctx.username(),
            groups = ?ctx.groups(),
            backend = backend.authz.backend(),
            "answering query"
        );

        let answer = self.command.execute(backend.authz.as_ref(), &ctx).await?;
        serde_json::to_writer_pretty(&mut *out, &answer)?;
        writeln!(out)?;
        Ok(())
    }

    async fn security_context(
        &self,
        identity: Option<&dyn IdentityResolver>,
    ) -> anyhow::Result<SecurityContext> {
        if let Some(token) = &self.token {
            let resolver =
                identity.ok_or_else(|| anyhow!("--token requires the kubernetes provider"))?;
            return resolver
                .resolve(Some(token))
                .await
                .context("failed to resolve the caller identity");
        }
        Ok(self
            .user
            .as_deref()
            .map_or_else(SecurityContext::anonymous, |user| {
                SecurityContext::builder()
                    .username(user)
                    .groups(self.groups.clone())
                    .build()
            }))
    }
}

impl Command {
    /// # Errors
    ///
    /// Enumeration failures of the backend.
    pub async fn execute(
        &self,
        authz: &dyn AuthorizationClient,
        ctx: &SecurityContext,
    ) -> anyhow::Result<Value> {
        match self {
            Self::Check {
                action,
                project,
                scope,
            } => {
                let allowed = authz.has_permission(ctx, *action, project, *scope).await;
                Ok(json!({ "allowed": allowed }))
            }
            Self::Projects { action, scope } => {
                let projects = authz
                    .get_user_projects(ctx, *action, *scope)
                    .await
                    .context("failed to list the caller's projects")?;
                Ok(json!({ "projects": projects }))
            }
            Self::Permissions => {
                let permissions = authz
                    .get_permissions(ctx)
                    .await
                    .context("failed to list the caller's permissions")?;
                Ok(serde_json::to_value(permissions)?)
            }
        }
    }
}
