//! Perses authorization CLI
//!
//! Answers permission queries against the configured backend and prints JSON.

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use perses_authz::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the JSON answer, logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    cli.run(&mut std::io::stdout().lock()).await
}
