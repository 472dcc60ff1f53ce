//! Binary configuration
//!
//! Selects the version and scratch directory of each containerized binary.
//! Lookups for binaries without an explicit entry fall back to a default.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration of one binary run inside a container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneDockerBinaryConfig {
    /// Scratch directory the binary may write to
    pub tmp_directory: String,

    /// Version tag of the binary package to run
    pub binary_version: String,
}

impl Default for OneDockerBinaryConfig {
    fn default() -> Self {
        Self {
            tmp_directory: "/tmp/".to_string(),
            binary_version: "latest".to_string(),
        }
    }
}

/// Binary configurations keyed by binary package name, with a fallback
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryConfigMap {
    #[serde(default)]
    pub default: OneDockerBinaryConfig,

    #[serde(default)]
    pub binaries: HashMap<String, OneDockerBinaryConfig>,
}

impl BinaryConfigMap {
    /// Creates a map that answers every lookup with `default`
    pub fn with_default(default: OneDockerBinaryConfig) -> Self {
        Self {
            default,
            binaries: HashMap::new(),
        }
    }

    /// Adds an explicit entry for a binary
    pub fn with_binary(mut self, name: impl Into<String>, config: OneDockerBinaryConfig) -> Self {
        self.binaries.insert(name.into(), config);
        self
    }

    /// Configuration for a binary, or the default when none is registered
    pub fn get(&self, name: &str) -> &OneDockerBinaryConfig {
        self.binaries.get(name).unwrap_or(&self.default)
    }
}
