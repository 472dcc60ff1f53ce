//! Stage services
//!
//! Each stage of the private computation pipeline is a service that takes a
//! pipeline instance, checks that the previous stage completed, and delegates
//! the heavy lifting to worker containers.

mod shard;

pub use shard::{ReshardPlan, ShardStageService};

use async_trait::async_trait;
use pcs_core::domain::instance::{PrivateComputationInstance, PrivateComputationInstanceStatus};

use crate::error::Result;

/// Pipeline stages backed by a stage service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageType {
    /// Splits ID matching output into the shards the computation stage consumes
    Reshard,
}

impl StageType {
    /// Status the instance carries while the stage runs
    pub fn started_status(&self) -> PrivateComputationInstanceStatus {
        match self {
            StageType::Reshard => PrivateComputationInstanceStatus::ReshardStarted,
        }
    }

    pub fn completed_status(&self) -> PrivateComputationInstanceStatus {
        match self {
            StageType::Reshard => PrivateComputationInstanceStatus::ReshardCompleted,
        }
    }

    pub fn failed_status(&self) -> PrivateComputationInstanceStatus {
        match self {
            StageType::Reshard => PrivateComputationInstanceStatus::ReshardFailed,
        }
    }

    /// Statuses the stage may start from: the previous stage's completion,
    /// or the stage's own failure for a retry
    pub fn can_start_from(&self, status: PrivateComputationInstanceStatus) -> bool {
        match self {
            StageType::Reshard => matches!(
                status,
                PrivateComputationInstanceStatus::IdMatchingCompleted
                    | PrivateComputationInstanceStatus::ReshardFailed
            ),
        }
    }
}

impl std::fmt::Display for StageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageType::Reshard => write!(f, "RESHARD"),
        }
    }
}

/// Service trait for running one stage of the pipeline
#[async_trait]
pub trait StageService: Send + Sync {
    /// The stage this service runs
    fn stage_type(&self) -> StageType;

    /// Runs the stage for an instance
    ///
    /// Returns once the stage's containers are scheduled, or finished when
    /// the service is configured to wait for them. The instance's status and
    /// stage records are updated in place.
    async fn run(&self, instance: &mut PrivateComputationInstance) -> Result<()>;
}
