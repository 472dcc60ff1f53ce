//! Private computation instance
//!
//! One run of the multi-stage private computation. The instance is built by
//! the caller before each stage and updated by the stage services as they
//! progress.

use serde::{Deserialize, Serialize};

use super::stage_state::StageStateInstance;

/// Pipeline instance describing one private computation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivateComputationInstance {
    pub instance_id: String,
    pub role: PrivateComputationRole,

    /// Records left by previous stages, oldest first
    #[serde(default)]
    pub instances: Vec<StageStateInstance>,

    pub status: PrivateComputationInstanceStatus,

    /// Unix timestamp (seconds) of the last status change
    pub status_update_ts: i64,

    pub num_pid_containers: u32,
    pub num_mpc_containers: u32,
    pub num_files_per_mpc_container: u32,
    pub game_type: PrivateComputationGameType,
    pub input_path: String,
    pub output_dir: String,
}

impl PrivateComputationInstance {
    /// Sets a new status, refreshing the update timestamp when it changes
    pub fn update_status(&mut self, status: PrivateComputationInstanceStatus) {
        if self.status != status {
            self.status = status;
            self.status_update_ts = chrono::Utc::now().timestamp();
        }
    }

    /// Record of the most recent stage, if any stage ran
    pub fn current_stage_state(&self) -> Option<&StageStateInstance> {
        self.instances.last()
    }

    /// Base path of the ID matching output
    pub fn pid_stage_output_base_path(&self) -> String {
        format!(
            "{}/{}_out_dir/pid_stage/out.csv",
            self.output_dir.trim_end_matches('/'),
            self.instance_id
        )
    }

    /// Base path of the combined ID matching output, one file per PID container
    pub fn pid_combine_output_path(&self) -> String {
        format!("{}_combine", self.pid_stage_output_base_path())
    }

    /// Base path the reshard stage writes its shards to
    pub fn data_processing_output_path(&self) -> String {
        format!(
            "{}/{}_out_dir/data_processing_stage/out.csv",
            self.output_dir.trim_end_matches('/'),
            self.instance_id
        )
    }
}

/// Path of the shard with the given index under a base path
pub fn sharded_filepath(base_path: &str, index: u32) -> String {
    format!("{}_{}", base_path, index)
}

/// Party the instance computes for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrivateComputationRole {
    Publisher,
    Partner,
}

/// Computation the pipeline runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrivateComputationGameType {
    Lift,
    Attribution,
}

/// Lifecycle status of a private computation instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrivateComputationInstanceStatus {
    Created,
    IdMatchingStarted,
    IdMatchingCompleted,
    IdMatchingFailed,
    ReshardStarted,
    ReshardCompleted,
    ReshardFailed,
    ComputationStarted,
    ComputationCompleted,
    ComputationFailed,
    Unknown,
}

impl std::fmt::Display for PrivateComputationInstanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Created => "CREATED",
            Self::IdMatchingStarted => "ID_MATCHING_STARTED",
            Self::IdMatchingCompleted => "ID_MATCHING_COMPLETED",
            Self::IdMatchingFailed => "ID_MATCHING_FAILED",
            Self::ReshardStarted => "RESHARD_STARTED",
            Self::ReshardCompleted => "RESHARD_COMPLETED",
            Self::ReshardFailed => "RESHARD_FAILED",
            Self::ComputationStarted => "COMPUTATION_STARTED",
            Self::ComputationCompleted => "COMPUTATION_COMPLETED",
            Self::ComputationFailed => "COMPUTATION_FAILED",
            Self::Unknown => "UNKNOWN",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_instance() -> PrivateComputationInstance {
        PrivateComputationInstance {
            instance_id: "test_instance_123".to_string(),
            role: PrivateComputationRole::Partner,
            instances: vec![],
            status: PrivateComputationInstanceStatus::IdMatchingCompleted,
            status_update_ts: 1_600_000_000,
            num_pid_containers: 2,
            num_mpc_containers: 2,
            num_files_per_mpc_container: 40,
            game_type: PrivateComputationGameType::Lift,
            input_path: "456".to_string(),
            output_dir: "789".to_string(),
        }
    }

    #[test]
    fn test_derived_paths() {
        let instance = sample_instance();
        assert_eq!(
            instance.pid_combine_output_path(),
            "789/test_instance_123_out_dir/pid_stage/out.csv_combine"
        );
        assert_eq!(
            instance.data_processing_output_path(),
            "789/test_instance_123_out_dir/data_processing_stage/out.csv"
        );
        assert_eq!(sharded_filepath("base", 3), "base_3");
    }

    #[test]
    fn test_update_status_refreshes_timestamp() {
        let mut instance = sample_instance();

        instance.update_status(PrivateComputationInstanceStatus::IdMatchingCompleted);
        assert_eq!(instance.status_update_ts, 1_600_000_000);

        instance.update_status(PrivateComputationInstanceStatus::ReshardStarted);
        assert_eq!(
            instance.status,
            PrivateComputationInstanceStatus::ReshardStarted
        );
        assert!(instance.status_update_ts > 1_600_000_000);
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = r#"{
            "instance_id": "test_instance_123",
            "role": "PARTNER",
            "status": "ID_MATCHING_COMPLETED",
            "status_update_ts": 1600000000,
            "num_pid_containers": 2,
            "num_mpc_containers": 2,
            "num_files_per_mpc_container": 40,
            "game_type": "LIFT",
            "input_path": "456",
            "output_dir": "789"
        }"#;

        let instance: PrivateComputationInstance = serde_json::from_str(json).unwrap();
        assert_eq!(instance, sample_instance());
        assert!(instance.current_stage_state().is_none());
    }

    #[test]
    fn test_status_display_matches_wire_name() {
        let status = PrivateComputationInstanceStatus::ReshardFailed;
        let wire = serde_json::to_string(&status).unwrap();
        assert_eq!(wire, format!("\"{}\"", status));
    }
}
