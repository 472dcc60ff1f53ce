//! Reading and writing instance files

use anyhow::{Context, Result};
use pcs_core::domain::instance::PrivateComputationInstance;
use std::path::Path;

/// Loads a pipeline instance from a JSON file
pub fn load_instance(path: &Path) -> Result<PrivateComputationInstance> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read instance {}", path.display()))?;

    serde_json::from_str(&raw).with_context(|| format!("Invalid instance {}", path.display()))
}

/// Writes a pipeline instance back as pretty JSON
pub fn save_instance(path: &Path, instance: &PrivateComputationInstance) -> Result<()> {
    let json = serde_json::to_string_pretty(instance)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
