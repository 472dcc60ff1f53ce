//! Error types for the stage services

use pcs_core::domain::instance::PrivateComputationInstanceStatus;
use thiserror::Error;

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while running a stage
#[derive(Debug, Error)]
pub enum Error {
    /// Instance is not in a status the stage may start from
    #[error("Instance {instance_id} cannot run {stage} from status {status}")]
    InvalidStatus {
        instance_id: String,
        stage: String,
        status: PrivateComputationInstanceStatus,
    },

    /// Instance sizing parameters cannot produce a valid plan
    #[error("Invalid instance {instance_id}: {message}")]
    InvalidInstance {
        instance_id: String,
        message: String,
    },

    /// Container backend failed to start, inspect or stop containers
    #[error("Container error: {0}")]
    Container(String),

    /// Containers did not finish in time
    #[error("Timed out after {seconds}s waiting for container {container_id}")]
    ContainerTimeout { container_id: String, seconds: u64 },

    /// Sharding containers could not be started
    #[error("Sharding failed: {0}")]
    Sharding(String),

    /// Invalid runtime configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Failed to spawn a backend process
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid instance error
    pub fn invalid_instance(instance_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInstance {
            instance_id: instance_id.into(),
            message: message.into(),
        }
    }

    /// Check if running the stage again may succeed without changing the instance
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Container(_) | Self::ContainerTimeout { .. } | Self::Sharding(_) | Self::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_status_message() {
        let err = Error::InvalidStatus {
            instance_id: "abc".to_string(),
            stage: "RESHARD".to_string(),
            status: PrivateComputationInstanceStatus::Created,
        };
        assert_eq!(
            err.to_string(),
            "Instance abc cannot run RESHARD from status CREATED"
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_backend_errors_are_retryable() {
        assert!(Error::Container("boom".to_string()).is_retryable());
        assert!(
            Error::ContainerTimeout {
                container_id: "c".to_string(),
                seconds: 5
            }
            .is_retryable()
        );
        assert!(!Error::invalid_instance("abc", "no containers").is_retryable());
        assert!(!Error::Config("bad".to_string()).is_retryable());
    }
}
