//! Sharding service
//!
//! Starts sharder containers that split input files into a fixed number of
//! output shards. The sharder binary does the splitting inside the container;
//! this layer only builds its arguments and hands them to the container backend.

mod args;
mod service;

pub use args::{ShardArgs, build_args};
pub use service::ContainerShardingService;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use pcs_core::domain::container::ContainerInstance;
use std::time::Duration;

use crate::error::Result;

/// Service trait for starting sharder containers
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ShardingService: Send + Sync {
    /// Starts one sharder container per argument line
    ///
    /// # Arguments
    /// * `cmd_args_list` - Argument lines built with `build_args`
    /// * `binary_version` - Version of the sharder package
    /// * `binary_name` - Package name of the sharder
    /// * `timeout` - Maximum run time of each container
    /// * `wait_for_containers` - Whether to return only after all containers exited
    ///
    /// # Returns
    /// Container records; final ones when waiting was requested
    async fn start_containers(
        &self,
        cmd_args_list: Vec<String>,
        binary_version: &str,
        binary_name: &str,
        timeout: Option<Duration>,
        wait_for_containers: bool,
    ) -> Result<Vec<ContainerInstance>>;
}
