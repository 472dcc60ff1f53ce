//! Container-backed sharding service

use async_trait::async_trait;
use pcs_core::domain::container::ContainerInstance;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::ShardingService;
use crate::container::ContainerService;
use crate::error::{Error, Result};

/// Sharding service that launches sharder containers through a container backend
pub struct ContainerShardingService {
    container_service: Arc<dyn ContainerService>,
}

impl ContainerShardingService {
    pub fn new(container_service: Arc<dyn ContainerService>) -> Self {
        Self { container_service }
    }
}

#[async_trait]
impl ShardingService for ContainerShardingService {
    async fn start_containers(
        &self,
        cmd_args_list: Vec<String>,
        binary_version: &str,
        binary_name: &str,
        timeout: Option<Duration>,
        wait_for_containers: bool,
    ) -> Result<Vec<ContainerInstance>> {
        if cmd_args_list.is_empty() {
            return Err(Error::Sharding("No sharder arguments given".to_string()));
        }

        info!(
            "Starting {} sharder container(s) ({}:{})",
            cmd_args_list.len(),
            binary_name,
            binary_version
        );

        let containers = self
            .container_service
            .start_containers(binary_name, binary_version, &cmd_args_list, timeout)
            .await?;

        if !wait_for_containers {
            return Ok(containers);
        }

        let ids: Vec<String> = containers.into_iter().map(|c| c.instance_id).collect();

        info!("Waiting for {} sharder container(s)", ids.len());
        let waited = self.container_service.wait_for_pending_containers(&ids).await;

        // Finished or not, the containers are removed once the wait is over
        if let Err(e) = self.container_service.stop_containers(&ids).await {
            warn!("Failed to remove sharder containers: {}", e);
        }

        waited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::MockContainerService;
    use pcs_core::domain::container::ContainerStatus;

    fn started(ids: &[&str]) -> Vec<ContainerInstance> {
        ids.iter()
            .map(|id| ContainerInstance::new(*id, ContainerStatus::Started))
            .collect()
    }

    #[tokio::test]
    async fn test_start_without_waiting() {
        let mut container_service = MockContainerService::new();
        container_service
            .expect_start_containers()
            .withf(|package, version, args, timeout| {
                package == "data_processing/sharder"
                    && version == "latest"
                    && args.len() == 2
                    && timeout.is_none()
            })
            .times(1)
            .returning(|_, _, _, _| Ok(started(&["c0", "c1"])));
        container_service.expect_wait_for_pending_containers().never();
        container_service.expect_stop_containers().never();

        let service = ContainerShardingService::new(Arc::new(container_service));
        let containers = service
            .start_containers(
                vec!["--a".to_string(), "--b".to_string()],
                "latest",
                "data_processing/sharder",
                None,
                false,
            )
            .await
            .unwrap();

        assert_eq!(containers, started(&["c0", "c1"]));
    }

    #[tokio::test]
    async fn test_start_and_wait() {
        let mut container_service = MockContainerService::new();
        container_service
            .expect_start_containers()
            .times(1)
            .returning(|_, _, _, _| Ok(started(&["c0", "c1"])));
        container_service
            .expect_wait_for_pending_containers()
            .withf(|ids| ids.to_vec() == vec!["c0".to_string(), "c1".to_string()])
            .times(1)
            .returning(|ids| {
                Ok(ids
                    .iter()
                    .map(|id| ContainerInstance::new(id.clone(), ContainerStatus::Completed))
                    .collect())
            });
        container_service
            .expect_stop_containers()
            .withf(|ids| ids.to_vec() == vec!["c0".to_string(), "c1".to_string()])
            .times(1)
            .returning(|_| Ok(()));

        let service = ContainerShardingService::new(Arc::new(container_service));
        let containers = service
            .start_containers(
                vec!["--a".to_string(), "--b".to_string()],
                "latest",
                "data_processing/sharder",
                Some(Duration::from_secs(60)),
                true,
            )
            .await
            .unwrap();

        assert!(
            containers
                .iter()
                .all(|c| c.status == ContainerStatus::Completed)
        );
    }

    #[tokio::test]
    async fn test_wait_timeout_removes_containers() {
        let mut container_service = MockContainerService::new();
        container_service
            .expect_start_containers()
            .times(1)
            .returning(|_, _, _, _| Ok(started(&["c0", "c1"])));
        container_service
            .expect_wait_for_pending_containers()
            .times(1)
            .returning(|_| {
                Err(Error::ContainerTimeout {
                    container_id: "c0".to_string(),
                    seconds: 1,
                })
            });
        container_service
            .expect_stop_containers()
            .withf(|ids| ids.to_vec() == vec!["c0".to_string(), "c1".to_string()])
            .times(1)
            .returning(|_| Ok(()));

        let service = ContainerShardingService::new(Arc::new(container_service));
        let err = service
            .start_containers(
                vec!["--a".to_string(), "--b".to_string()],
                "latest",
                "data_processing/sharder",
                Some(Duration::from_secs(1)),
                true,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ContainerTimeout { .. }));
    }

    #[tokio::test]
    async fn test_cleanup_failure_keeps_wait_result() {
        let mut container_service = MockContainerService::new();
        container_service
            .expect_start_containers()
            .returning(|_, _, _, _| Ok(started(&["c0"])));
        container_service
            .expect_wait_for_pending_containers()
            .returning(|_| Ok(vec![ContainerInstance::new("c0", ContainerStatus::Completed)]));
        container_service
            .expect_stop_containers()
            .times(1)
            .returning(|_| Err(Error::Container("rm failed".to_string())));

        let service = ContainerShardingService::new(Arc::new(container_service));
        let containers = service
            .start_containers(vec!["--a".to_string()], "latest", "sharder", None, true)
            .await
            .unwrap();

        assert_eq!(containers[0].status, ContainerStatus::Completed);
    }

    #[tokio::test]
    async fn test_backend_error_is_propagated() {
        let mut container_service = MockContainerService::new();
        container_service
            .expect_start_containers()
            .returning(|_, _, _, _| Err(Error::Container("podman missing".to_string())));

        let service = ContainerShardingService::new(Arc::new(container_service));
        let err = service
            .start_containers(vec!["--a".to_string()], "latest", "sharder", None, true)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Container(_)));
    }

    #[tokio::test]
    async fn test_empty_argument_list_is_rejected() {
        let mut container_service = MockContainerService::new();
        container_service.expect_start_containers().never();

        let service = ContainerShardingService::new(Arc::new(container_service));
        let err = service
            .start_containers(vec![], "latest", "sharder", None, false)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Sharding(_)));
    }
}
