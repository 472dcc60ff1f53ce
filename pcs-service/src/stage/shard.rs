//! Reshard stage service
//!
//! Handles the reshard stage of the pipeline:
//! - Checking that ID matching completed
//! - Planning how each ID matching output file is split
//! - Starting the sharder containers through the sharding service
//! - Recording the containers and the outcome on the instance
//!
//! Every ID matching output file is split into the same number of shards so
//! that the rows of one file stay on a contiguous range of computation
//! containers.

use async_trait::async_trait;
use pcs_core::constants::SHARDER_BINARY;
use pcs_core::domain::binary_config::BinaryConfigMap;
use pcs_core::domain::container::ContainerStatus;
use pcs_core::domain::instance::{PrivateComputationInstance, sharded_filepath};
use pcs_core::domain::stage_state::{StageStateInstance, StageStatus};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use super::{StageService, StageType};
use crate::config::Config;
use crate::container::ContainerService;
use crate::error::{Error, Result};
use crate::sharding::{ContainerShardingService, ShardArgs, ShardingService, build_args};

/// Sharder invocations derived from an instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReshardPlan {
    pub binary_name: String,
    pub binary_version: String,

    /// One entry per ID matching output file
    pub shards: Vec<ShardArgs>,
}

impl ReshardPlan {
    /// Argument lines, one per sharder container
    pub fn cmd_args_list(&self) -> Vec<String> {
        self.shards.iter().map(build_args).collect()
    }

    /// Derives the sharder invocations for an instance
    ///
    /// Every input file gets the same number of output shards, on a
    /// contiguous range of shard indexes.
    pub fn for_instance(
        instance: &PrivateComputationInstance,
        binary_config_map: &BinaryConfigMap,
        hmac_key: Option<String>,
    ) -> Result<Self> {
        let num_input_files = instance.num_pid_containers;

        if num_input_files == 0 {
            return Err(Error::invalid_instance(
                &instance.instance_id,
                "num_pid_containers must be greater than 0",
            ));
        }

        if instance.num_mpc_containers == 0 || instance.num_files_per_mpc_container == 0 {
            return Err(Error::invalid_instance(
                &instance.instance_id,
                "num_mpc_containers and num_files_per_mpc_container must be greater than 0",
            ));
        }

        let total_shards = instance
            .num_mpc_containers
            .checked_mul(instance.num_files_per_mpc_container)
            .ok_or_else(|| {
                Error::invalid_instance(&instance.instance_id, "total shard count overflows")
            })?;

        if total_shards % num_input_files != 0 {
            return Err(Error::invalid_instance(
                &instance.instance_id,
                format!(
                    "{} output shards cannot be split evenly across {} input files",
                    total_shards, num_input_files
                ),
            ));
        }

        let shards_per_file = total_shards / num_input_files;
        let binary_config = binary_config_map.get(SHARDER_BINARY);
        let input_base_path = instance.pid_combine_output_path();
        let output_base_path = instance.data_processing_output_path();

        let shards = (0..num_input_files)
            .map(|index| ShardArgs {
                input_filename: sharded_filepath(&input_base_path, index),
                output_base_path: output_base_path.clone(),
                file_start_index: index * shards_per_file,
                num_output_files: shards_per_file,
                tmp_directory: binary_config.tmp_directory.clone(),
                hmac_key: hmac_key.clone(),
            })
            .collect();

        Ok(Self {
            binary_name: SHARDER_BINARY.to_string(),
            binary_version: binary_config.binary_version.clone(),
            shards,
        })
    }
}

/// Stage service that reshards ID matching output for the computation stage
pub struct ShardStageService {
    sharding_service: Arc<dyn ShardingService>,
    binary_config_map: BinaryConfigMap,
    container_timeout: Option<Duration>,
    wait_for_containers: bool,
    hmac_key: Option<String>,
}

impl ShardStageService {
    /// Creates a reshard stage that starts sharders on the given container backend
    ///
    /// # Arguments
    /// * `container_service` - Backend the sharder containers run on
    /// * `binary_config_map` - Version and scratch directory per binary
    /// * `config` - Timeout, wait and hashing settings
    pub fn new(
        container_service: Arc<dyn ContainerService>,
        binary_config_map: BinaryConfigMap,
        config: &Config,
    ) -> Self {
        let sharding_service = Arc::new(ContainerShardingService::new(container_service));
        Self::with_sharding_service(sharding_service, binary_config_map, config)
    }

    /// Creates a reshard stage over an explicit sharding service
    pub fn with_sharding_service(
        sharding_service: Arc<dyn ShardingService>,
        binary_config_map: BinaryConfigMap,
        config: &Config,
    ) -> Self {
        Self {
            sharding_service,
            binary_config_map,
            container_timeout: config.container_timeout,
            wait_for_containers: config.wait_for_containers,
            hmac_key: config.hmac_key.clone(),
        }
    }

    /// Derives the sharder invocations for an instance without starting anything
    pub fn plan(&self, instance: &PrivateComputationInstance) -> Result<ReshardPlan> {
        ReshardPlan::for_instance(instance, &self.binary_config_map, self.hmac_key.clone())
    }

    fn check_status(&self, instance: &PrivateComputationInstance) -> Result<()> {
        let stage = self.stage_type();
        if stage.can_start_from(instance.status) {
            Ok(())
        } else {
            Err(Error::InvalidStatus {
                instance_id: instance.instance_id.clone(),
                stage: stage.to_string(),
                status: instance.status,
            })
        }
    }
}

#[async_trait]
impl StageService for ShardStageService {
    fn stage_type(&self) -> StageType {
        StageType::Reshard
    }

    async fn run(&self, instance: &mut PrivateComputationInstance) -> Result<()> {
        let stage = self.stage_type();

        self.check_status(instance)?;
        let plan = self.plan(instance)?;

        info!(
            "[{}] Starting reshard: {} input file(s) into {} shard(s) each",
            instance.instance_id,
            plan.shards.len(),
            plan.shards.first().map(|s| s.num_output_files).unwrap_or(0)
        );

        instance.update_status(stage.started_status());

        let containers = match self
            .sharding_service
            .start_containers(
                plan.cmd_args_list(),
                &plan.binary_version,
                &plan.binary_name,
                self.container_timeout,
                self.wait_for_containers,
            )
            .await
        {
            Ok(containers) => containers,
            Err(e) => {
                error!("[{}] Failed to start sharders: {}", instance.instance_id, e);
                instance.update_status(stage.failed_status());
                return Err(e);
            }
        };

        let failed = containers
            .iter()
            .filter(|c| c.status == ContainerStatus::Failed)
            .count();
        let total = containers.len();

        let stage_state =
            StageStateInstance::new(instance.instance_id.clone(), stage.to_string(), containers);
        let stage_status = stage_state.status;
        instance.instances.push(stage_state);

        match stage_status {
            StageStatus::Completed => {
                info!("[{}] All sharders finished", instance.instance_id);
                instance.update_status(stage.completed_status());
                Ok(())
            }
            StageStatus::Failed => {
                error!(
                    "[{}] {} of {} sharder container(s) failed",
                    instance.instance_id, failed, total
                );
                instance.update_status(stage.failed_status());
                Err(Error::Sharding(format!(
                    "{} of {} sharder container(s) failed",
                    failed, total
                )))
            }
            StageStatus::Started | StageStatus::Unknown => {
                debug!(
                    "[{}] {} sharder container(s) scheduled",
                    instance.instance_id, total
                );
                Ok(())
            }
        }
    }
}
