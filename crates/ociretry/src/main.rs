//! `ociretry` entry point.
//!
//! Reads `ociretry.toml` (or `--config`), checks the OCI CLI, then retries
//! the launch until an instance is running. Ctrl+C stops the loop cleanly.
//!
//! Exit status: 0 on success or interrupt, 1 when the retry budget runs out,
//! the CLI is missing, or the configuration cannot be loaded.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use ociretry::{
    ConsoleReporter, DEFAULT_CONFIG_FILE, OciCliGateway, ProvisionConfig, ProvisionError,
    provision,
};
use tokio_util::sync::CancellationToken;

/// Keep retrying an OCI instance launch until capacity frees up
#[derive(Debug, Parser)]
#[command(name = "ociretry", version, about)]
struct Cli {
    /// Configuration file
    #[arg(short, long, env = "OCIRETRY_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("ociretry v{} starting", env!("CARGO_PKG_VERSION"));

    let config = ProvisionConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => on_interrupt.cancel(),
            Err(err) => tracing::warn!(error = %err, "Cannot listen for Ctrl+C"),
        }
    });

    let with_ansi =
        !cli.no_color && std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal();
    let gateway = OciCliGateway::new(&config.cli_path);

    match provision(&config, gateway, ConsoleReporter::stdout(with_ansi), cancel).await {
        Ok(outcome) => Ok(ExitCode::from(outcome.exit_code())),
        // Already shown to the operator with the install hint.
        Err(ProvisionError::PrerequisiteMissing(_)) => Ok(ExitCode::FAILURE),
        Err(err) => Err(err.into()),
    }
}
