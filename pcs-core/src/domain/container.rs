//! Container domain model
//!
//! Represents a worker container started on behalf of a stage.

use serde::{Deserialize, Serialize};

/// A container started by the container orchestration service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerInstance {
    /// Identifier assigned by the orchestration backend
    pub instance_id: String,

    /// Address of the container, when the backend exposes one
    pub ip_address: Option<String>,

    /// Last known status of the container
    pub status: ContainerStatus,
}

impl ContainerInstance {
    pub fn new(instance_id: impl Into<String>, status: ContainerStatus) -> Self {
        Self {
            instance_id: instance_id.into(),
            ip_address: None,
            status,
        }
    }
}

/// Status of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContainerStatus {
    /// Container was launched and has not finished yet
    Started,

    /// Container exited successfully
    Completed,

    /// Container exited with an error or could not run
    Failed,

    /// Backend could not report a status
    Unknown,
}

impl ContainerStatus {
    /// Whether the container will not change status anymore
    pub fn is_terminal(&self) -> bool {
        matches!(self, ContainerStatus::Completed | ContainerStatus::Failed)
    }
}

impl std::fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerStatus::Started => write!(f, "Started"),
            ContainerStatus::Completed => write!(f, "Completed"),
            ContainerStatus::Failed => write!(f, "Failed"),
            ContainerStatus::Unknown => write!(f, "Unknown"),
        }
    }
}
