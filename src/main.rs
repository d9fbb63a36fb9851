//! # Book Network CLI Entry Point

use anyhow::Context;
use booknet::{
    cli::{self, Cli},
    config::ConfigLoader,
    telemetry::{self, TraceContext},
};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Load configuration from layered env files and variables
    let config = ConfigLoader::new()
        .load()
        .context("loading configuration")?;
    telemetry::init_tracing(&config).context("initializing telemetry")?;

    tracing::debug!(profile = %config.profile, "Loaded configuration");

    let context = TraceContext::for_command(args.command.name());
    telemetry::with_trace_context(context, cli::run(args, config)).await
}
