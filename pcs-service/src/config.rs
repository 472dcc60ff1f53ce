//! Stage service configuration
//!
//! Defines the parameters of the container backend and of how long the
//! stage services wait for the containers they start.

use std::time::Duration;

use crate::error::{Error, Result};

/// Default image the podman backend launches binaries in
pub const DEFAULT_CONTAINER_IMAGE: &str = "docker.io/library/onedocker:latest";

/// Default command inside the image that runs a binary package
pub const DEFAULT_CONTAINER_ENTRYPOINT: &str = "onedocker-runner";

/// Stage service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Image every worker container is started from
    pub container_image: String,

    /// Command inside the image that resolves and runs a binary package
    pub container_entrypoint: String,

    /// Maximum time a container may run (None = unbounded)
    pub container_timeout: Option<Duration>,

    /// Whether a stage waits for its containers to finish before returning
    pub wait_for_containers: bool,

    /// Key used by the sharder to hash identifiers, if any
    pub hmac_key: Option<String>,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(container_image: String) -> Self {
        Self {
            container_image,
            container_entrypoint: DEFAULT_CONTAINER_ENTRYPOINT.to_string(),
            container_timeout: Some(Duration::from_secs(3600)),
            wait_for_containers: true,
            hmac_key: None,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - PCS_CONTAINER_IMAGE (optional, default: DEFAULT_CONTAINER_IMAGE)
    /// - PCS_CONTAINER_ENTRYPOINT (optional, default: onedocker-runner)
    /// - PCS_CONTAINER_TIMEOUT (optional, seconds, 0 = unbounded, default: 3600)
    /// - PCS_WAIT_FOR_CONTAINERS (optional, true/false, default: true)
    /// - PCS_HMAC_KEY (optional)
    pub fn from_env() -> Result<Self> {
        let container_image = std::env::var("PCS_CONTAINER_IMAGE")
            .unwrap_or_else(|_| DEFAULT_CONTAINER_IMAGE.to_string());

        let mut config = Self::new(container_image);

        if let Ok(entrypoint) = std::env::var("PCS_CONTAINER_ENTRYPOINT") {
            config.container_entrypoint = entrypoint;
        }

        if let Ok(raw) = std::env::var("PCS_CONTAINER_TIMEOUT") {
            let seconds = raw.parse::<u64>().map_err(|_| {
                Error::Config(format!("PCS_CONTAINER_TIMEOUT is not a number: {}", raw))
            })?;
            config.container_timeout = (seconds > 0).then(|| Duration::from_secs(seconds));
        }

        if let Ok(raw) = std::env::var("PCS_WAIT_FOR_CONTAINERS") {
            config.wait_for_containers = parse_bool(&raw).ok_or_else(|| {
                Error::Config(format!("PCS_WAIT_FOR_CONTAINERS is not a boolean: {}", raw))
            })?;
        }

        config.hmac_key = std::env::var("PCS_HMAC_KEY")
            .ok()
            .filter(|key| !key.is_empty());

        Ok(config)
    }

    /// Sets the container timeout
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.container_timeout = timeout;
        self
    }

    /// Sets whether stages wait for their containers
    pub fn with_wait(mut self, wait: bool) -> Self {
        self.wait_for_containers = wait;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.container_image.trim().is_empty() {
            return Err(Error::Config("container_image cannot be empty".to_string()));
        }

        if self.container_entrypoint.trim().is_empty() {
            return Err(Error::Config(
                "container_entrypoint cannot be empty".to_string(),
            ));
        }

        if self.container_timeout == Some(Duration::ZERO) {
            return Err(Error::Config(
                "container_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_CONTAINER_IMAGE.to_string())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
