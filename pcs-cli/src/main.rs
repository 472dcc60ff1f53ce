//! PCS CLI
//!
//! Command-line interface for running stages of a private computation instance.

mod commands;
mod config;
mod instance_file;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pcs")]
#[command(about = "Private computation stage runner", long_about = None)]
struct Cli {
    /// JSON file with the binary configuration map
    #[arg(long, env = "PCS_BINARY_CONFIG")]
    binary_config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pcs_cli=info,pcs_service=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::load(cli.binary_config.as_deref())?;

    handle_command(cli.command, &config).await
}
