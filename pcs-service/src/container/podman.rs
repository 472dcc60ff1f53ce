//! Podman container backend
//!
//! Runs every binary package in a detached container started from one
//! runner image:
//! - Checking podman availability
//! - Starting one container per argument line
//! - Waiting for containers and reading their final state
//! - Removing containers

use async_trait::async_trait;
use pcs_core::domain::container::{ContainerInstance, ContainerStatus};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::ContainerService;
use crate::config::Config;
use crate::error::{Error, Result};

/// Checks if podman is installed and available
pub async fn check_podman_available() -> Result<()> {
    let output = Command::new("podman")
        .arg("--version")
        .output()
        .await
        .map_err(|e| {
            Error::Container(format!(
                "Failed to execute 'podman --version'. Is podman installed? {}",
                e
            ))
        })?;

    if !output.status.success() {
        return Err(Error::Container(
            "Podman is not working correctly".to_string(),
        ));
    }

    let version = String::from_utf8_lossy(&output.stdout);
    info!("Podman is available: {}", version.trim());

    Ok(())
}

/// Container service backed by the podman CLI
pub struct PodmanContainerService {
    image: String,
    entrypoint: String,

    /// Upper bound on a single `podman wait`
    wait_timeout: Option<Duration>,
}

impl PodmanContainerService {
    /// Creates a podman backend from the stage configuration
    pub fn new(config: &Config) -> Self {
        Self {
            image: config.container_image.clone(),
            entrypoint: config.container_entrypoint.clone(),
            wait_timeout: config.container_timeout,
        }
    }

    /// Builds the `podman run` arguments for one container
    fn run_args(
        &self,
        container_name: &str,
        package_name: &str,
        version: &str,
        cmd_args: &str,
        timeout: Option<Duration>,
    ) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "-d".to_string(),
            "--name".to_string(),
            container_name.to_string(),
            "--entrypoint".to_string(),
            self.entrypoint.clone(),
            self.image.clone(),
            package_name.to_string(),
            format!("--version={}", version),
            format!("--exe_args={}", cmd_args),
        ];

        if let Some(timeout) = timeout {
            args.push(format!("--timeout={}", timeout.as_secs()));
        }

        args
    }

    /// Starts a single container and returns its name
    async fn start_one(
        &self,
        package_name: &str,
        version: &str,
        cmd_args: &str,
        timeout: Option<Duration>,
    ) -> Result<ContainerInstance> {
        let container_name = generate_container_name();

        info!(
            "Creating container {} for {}:{}",
            container_name, package_name, version
        );

        let output = Command::new("podman")
            .args(self.run_args(&container_name, package_name, version, cmd_args, timeout))
            .output()
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !stdout.trim().is_empty() {
            debug!("podman run stdout: {}", stdout.trim());
        }
        if !stderr.trim().is_empty() {
            debug!("podman run stderr: {}", stderr.trim());
        }

        if !output.status.success() {
            let error_msg = format!(
                "Failed to start container for {}: exit_code={}, stderr='{}'",
                package_name,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            );

            error!("{}", error_msg);
            return Err(Error::Container(error_msg));
        }

        info!(
            "Container {} started with ID: {}",
            container_name,
            stdout.trim()
        );

        Ok(ContainerInstance::new(
            container_name,
            ContainerStatus::Started,
        ))
    }

    /// Blocks until the container exits or the deadline passes
    async fn wait_one(&self, container_id: &str, deadline: Option<Instant>) -> Result<()> {
        let mut command = Command::new("podman");
        command.arg("wait").arg(container_id).kill_on_drop(true);

        let output = match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, command.output())
                .await
                .map_err(|_| Error::ContainerTimeout {
                    container_id: container_id.to_string(),
                    seconds: self.wait_timeout.map(|t| t.as_secs()).unwrap_or_default(),
                })??,
            None => command.output().await?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Container(format!(
                "podman wait failed for {}: {}",
                container_id,
                stderr.trim()
            )));
        }

        debug!(
            "Container {} exited with code {}",
            container_id,
            String::from_utf8_lossy(&output.stdout).trim()
        );

        Ok(())
    }

    /// Reads the current state of a container
    async fn inspect(&self, container_id: &str) -> Result<ContainerInstance> {
        let output = Command::new("podman")
            .arg("inspect")
            .arg("--format")
            .arg(INSPECT_FORMAT)
            .arg(container_id)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Container(format!(
                "podman inspect failed for {}: {}",
                container_id,
                stderr.trim()
            )));
        }

        Ok(parse_inspect_output(
            container_id,
            &String::from_utf8_lossy(&output.stdout),
        ))
    }
}

#[async_trait]
impl ContainerService for PodmanContainerService {
    async fn start_containers(
        &self,
        package_name: &str,
        version: &str,
        cmd_args_list: &[String],
        timeout: Option<Duration>,
    ) -> Result<Vec<ContainerInstance>> {
        let mut started: Vec<ContainerInstance> = Vec::with_capacity(cmd_args_list.len());

        for cmd_args in cmd_args_list {
            match self.start_one(package_name, version, cmd_args, timeout).await {
                Ok(container) => started.push(container),
                Err(e) => {
                    // Don't leave half a stage running
                    let ids: Vec<String> = started.into_iter().map(|c| c.instance_id).collect();
                    if let Err(cleanup_err) = self.stop_containers(&ids).await {
                        warn!("Failed to clean up started containers: {}", cleanup_err);
                    }
                    return Err(e);
                }
            }
        }

        Ok(started)
    }

    async fn wait_for_pending_containers(
        &self,
        container_ids: &[String],
    ) -> Result<Vec<ContainerInstance>> {
        let mut finished = Vec::with_capacity(container_ids.len());

        // One budget for the whole batch, not one per container
        let deadline = wait_deadline(self.wait_timeout, Instant::now());

        for container_id in container_ids {
            self.wait_one(container_id, deadline).await?;
            finished.push(self.inspect(container_id).await?);
        }

        Ok(finished)
    }

    async fn stop_containers(&self, container_ids: &[String]) -> Result<()> {
        let mut failures = Vec::new();

        for container_id in container_ids {
            debug!("Removing container {}", container_id);

            let output = Command::new("podman")
                .arg("rm")
                .arg("-f")
                .arg(container_id)
                .output()
                .await;

            match output {
                Ok(output) if output.status.success() => {
                    debug!("Container {} removed", container_id);
                }
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!("Failed to remove container {}: {}", container_id, stderr);
                    failures.push(container_id.clone());
                }
                Err(e) => {
                    warn!("Failed to remove container {}: {}", container_id, e);
                    failures.push(container_id.clone());
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::Container(format!(
                "Failed to remove container(s): {}",
                failures.join(", ")
            )))
        }
    }
}

const INSPECT_FORMAT: &str = "{{.State.Status}} {{.State.ExitCode}} {{.NetworkSettings.IPAddress}}";

fn wait_deadline(timeout: Option<Duration>, now: Instant) -> Option<Instant> {
    timeout.map(|timeout| now + timeout)
}

fn generate_container_name() -> String {
    format!("pcs-{}", Uuid::new_v4())
}

/// Maps `podman inspect` output (status, exit code, address) to a container record
fn parse_inspect_output(container_id: &str, output: &str) -> ContainerInstance {
    let mut fields = output.split_whitespace();
    let state = fields.next().unwrap_or_default();
    let exit_code = fields.next().and_then(|code| code.parse::<i32>().ok());
    let ip_address = fields
        .next()
        .filter(|ip| !ip.is_empty())
        .map(str::to_string);

    let status = match (state, exit_code) {
        ("created" | "configured" | "running" | "paused", _) => ContainerStatus::Started,
        ("exited" | "stopped", Some(0)) => ContainerStatus::Completed,
        ("exited" | "stopped", _) => ContainerStatus::Failed,
        _ => ContainerStatus::Unknown,
    };

    ContainerInstance {
        instance_id: container_id.to_string(),
        ip_address,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> PodmanContainerService {
        PodmanContainerService::new(&Config::new("localhost/runner:dev".to_string()))
    }

    #[test]
    fn test_run_args() {
        let args = service().run_args(
            "pcs-test",
            "data_processing/sharder",
            "latest",
            "--input_filename=in_0 --num_output_files=40",
            Some(Duration::from_secs(600)),
        );

        assert_eq!(
            args,
            vec![
                "run",
                "-d",
                "--name",
                "pcs-test",
                "--entrypoint",
                "onedocker-runner",
                "localhost/runner:dev",
                "data_processing/sharder",
                "--version=latest",
                "--exe_args=--input_filename=in_0 --num_output_files=40",
                "--timeout=600",
            ]
        );
    }

    #[test]
    fn test_run_args_without_timeout() {
        let args = service().run_args("pcs-test", "pkg", "v1", "", None);
        assert!(!args.iter().any(|arg| arg.starts_with("--timeout")));
    }

    #[test]
    fn test_parse_inspect_output() {
        let running = parse_inspect_output("c1", "running 0 10.88.0.4\n");
        assert_eq!(running.status, ContainerStatus::Started);
        assert_eq!(running.ip_address.as_deref(), Some("10.88.0.4"));

        let done = parse_inspect_output("c2", "exited 0 ");
        assert_eq!(done.status, ContainerStatus::Completed);
        assert_eq!(done.ip_address, None);

        let failed = parse_inspect_output("c3", "exited 137");
        assert_eq!(failed.status, ContainerStatus::Failed);

        let unknown = parse_inspect_output("c4", "");
        assert_eq!(unknown.status, ContainerStatus::Unknown);
        assert_eq!(unknown.instance_id, "c4");
    }

    #[test]
    fn test_wait_deadline() {
        let now = Instant::now();
        assert_eq!(
            wait_deadline(Some(Duration::from_secs(30)), now),
            Some(now + Duration::from_secs(30))
        );
        assert_eq!(wait_deadline(None, now), None);
    }

    #[test]
    fn test_container_names_are_unique() {
        let a = generate_container_name();
        let b = generate_container_name();
        assert!(a.starts_with("pcs-"));
        assert_ne!(a, b);
    }
}
