//! Configuration module
//!
//! Combines the stage service settings from the environment with the
//! binary configuration map.

use anyhow::{Context, Result};
use pcs_core::domain::binary_config::BinaryConfigMap;
use std::path::Path;
use tracing::info;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Stage service settings
    pub service: pcs_service::Config,

    /// Binary version and scratch directory per binary
    pub binaries: BinaryConfigMap,
}

impl Config {
    /// Loads the configuration
    ///
    /// Falls back to the default binary configuration when no file is given.
    pub fn load(binary_config_path: Option<&Path>) -> Result<Self> {
        let service = pcs_service::Config::from_env().context("Failed to read configuration")?;
        service.validate()?;

        let binaries = match binary_config_path {
            Some(path) => load_binary_config(path)?,
            None => {
                info!("No binary configuration given, using defaults");
                BinaryConfigMap::default()
            }
        };

        Ok(Self { service, binaries })
    }
}

fn load_binary_config(path: &Path) -> Result<BinaryConfigMap> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read binary config {}", path.display()))?;

    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid binary config {}", path.display()))
}
