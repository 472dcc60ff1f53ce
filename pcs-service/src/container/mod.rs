//! Container orchestration
//!
//! Abstracts how worker containers are launched, awaited and stopped.
//! Stage services only see the `ContainerService` trait; the podman
//! backend is one implementation of it.

mod podman;

pub use podman::{PodmanContainerService, check_podman_available};

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use pcs_core::domain::container::ContainerInstance;
use std::time::Duration;

use crate::error::Result;

/// Service trait for launching and tracking worker containers
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ContainerService: Send + Sync {
    /// Starts one container per argument line
    ///
    /// # Arguments
    /// * `package_name` - Binary package each container runs (e.g. "data_processing/sharder")
    /// * `version` - Version tag of the package
    /// * `cmd_args_list` - One argument line per container
    /// * `timeout` - Maximum run time of each container
    ///
    /// # Returns
    /// The started containers, in the order of `cmd_args_list`
    async fn start_containers(
        &self,
        package_name: &str,
        version: &str,
        cmd_args_list: &[String],
        timeout: Option<Duration>,
    ) -> Result<Vec<ContainerInstance>>;

    /// Waits until every given container has exited
    ///
    /// # Returns
    /// Final records of the containers, in the order of `container_ids`
    async fn wait_for_pending_containers(
        &self,
        container_ids: &[String],
    ) -> Result<Vec<ContainerInstance>>;

    /// Stops and removes the given containers
    async fn stop_containers(&self, container_ids: &[String]) -> Result<()>;
}
