//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod plan;
mod reshard;

use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the reshard stage for an instance
    Reshard {
        /// JSON file with the pipeline instance
        #[arg(long)]
        instance: PathBuf,

        /// Write the updated instance back to the file
        #[arg(long)]
        write: bool,
    },
    /// Show the sharder invocations for an instance without starting containers
    Plan {
        /// JSON file with the pipeline instance
        #[arg(long)]
        instance: PathBuf,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Reshard { instance, write } => {
            reshard::handle_reshard(&instance, write, config).await
        }
        Commands::Plan { instance } => plan::handle_plan(&instance, config),
    }
}
