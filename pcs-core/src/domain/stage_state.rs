//! Stage state records
//!
//! Every stage that launches containers leaves a record of them on the
//! pipeline instance, in the order the stages ran.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::container::{ContainerInstance, ContainerStatus};

/// Record of one stage run and the containers it started
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageStateInstance {
    /// Pipeline instance this record belongs to
    pub instance_id: String,

    /// Name of the stage that produced the record (e.g. "RESHARD")
    pub stage_name: String,

    pub status: StageStatus,

    pub containers: Vec<ContainerInstance>,

    pub created_ts: DateTime<Utc>,
}

impl StageStateInstance {
    /// Creates a record whose status is derived from its containers
    pub fn new(
        instance_id: impl Into<String>,
        stage_name: impl Into<String>,
        containers: Vec<ContainerInstance>,
    ) -> Self {
        let status = StageStatus::from_containers(&containers);
        Self {
            instance_id: instance_id.into(),
            stage_name: stage_name.into(),
            status,
            containers,
            created_ts: Utc::now(),
        }
    }
}

/// Aggregate status of a stage's containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageStatus {
    Started,
    Completed,
    Failed,
    Unknown,
}

impl StageStatus {
    /// Any failed container fails the stage; the stage completes only
    /// when every container completed.
    pub fn from_containers(containers: &[ContainerInstance]) -> Self {
        if containers.is_empty() {
            return StageStatus::Unknown;
        }

        if containers
            .iter()
            .any(|c| c.status == ContainerStatus::Failed)
        {
            StageStatus::Failed
        } else if containers
            .iter()
            .all(|c| c.status == ContainerStatus::Completed)
        {
            StageStatus::Completed
        } else {
            StageStatus::Started
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(id: &str, status: ContainerStatus) -> ContainerInstance {
        ContainerInstance::new(id, status)
    }

    #[test]
    fn test_stage_status_failed_wins() {
        let containers = vec![
            container("a", ContainerStatus::Completed),
            container("b", ContainerStatus::Failed),
            container("c", ContainerStatus::Started),
        ];
        assert_eq!(
            StageStatus::from_containers(&containers),
            StageStatus::Failed
        );
    }

    #[test]
    fn test_stage_status_all_completed() {
        let containers = vec![
            container("a", ContainerStatus::Completed),
            container("b", ContainerStatus::Completed),
        ];
        assert_eq!(
            StageStatus::from_containers(&containers),
            StageStatus::Completed
        );
    }

    #[test]
    fn test_stage_status_pending() {
        let containers = vec![
            container("a", ContainerStatus::Completed),
            container("b", ContainerStatus::Started),
        ];
        assert_eq!(
            StageStatus::from_containers(&containers),
            StageStatus::Started
        );
        assert_eq!(StageStatus::from_containers(&[]), StageStatus::Unknown);
    }

    #[test]
    fn test_new_record_derives_status() {
        let record = StageStateInstance::new(
            "instance",
            "RESHARD",
            vec![container("a", ContainerStatus::Started)],
        );
        assert_eq!(record.status, StageStatus::Started);
        assert_eq!(record.stage_name, "RESHARD");
    }
}
