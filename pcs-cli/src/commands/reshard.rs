//! Reshard command handler
//!
//! Runs the reshard stage against the podman backend and reports the result.

use anyhow::{Context, Result};
use colored::*;
use pcs_core::domain::instance::{PrivateComputationInstance, PrivateComputationInstanceStatus};
use pcs_core::domain::stage_state::StageStateInstance;
use pcs_service::container::{ContainerService, PodmanContainerService, check_podman_available};
use pcs_service::stage::{ShardStageService, StageService};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::instance_file::{load_instance, save_instance};

/// Handle the reshard command
pub async fn handle_reshard(instance_path: &Path, write: bool, config: &Config) -> Result<()> {
    let mut instance = load_instance(instance_path)?;

    check_podman_available().await?;

    let container_service: Arc<dyn ContainerService> =
        Arc::new(PodmanContainerService::new(&config.service));
    let stage = ShardStageService::new(container_service, config.binaries.clone(), &config.service);

    info!("Running {} for {}", stage.stage_type(), instance.instance_id);
    let result = stage.run(&mut instance).await;

    // The instance records failures too, so save it either way
    let saved = if write {
        save_instance(instance_path, &instance)
    } else {
        Ok(())
    };

    print_instance_summary(&instance);

    let result = result.with_context(|| format!("Reshard failed for {}", instance.instance_id));
    combine_results(result, saved)
}

/// Reports the stage result first; a save failure is attached to it or returned alone
fn combine_results(result: Result<()>, saved: Result<()>) -> Result<()> {
    match (result, saved) {
        (Err(e), Err(save_err)) => {
            Err(e.context(format!("Also failed to save instance: {:#}", save_err)))
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), saved) => saved,
    }
}

/// Print the status of an instance and its latest stage
fn print_instance_summary(instance: &PrivateComputationInstance) {
    println!("{}", "Instance:".bold());
    println!("  ID:      {}", instance.instance_id.cyan());
    println!("  Status:  {}", colorize_status(instance.status));

    if let Some(stage_state) = instance.current_stage_state() {
        print_stage_state(stage_state);
    }
}

fn print_stage_state(stage_state: &StageStateInstance) {
    println!("\n{}", format!("Stage {}:", stage_state.stage_name).bold());
    println!("  Status:  {:?}", stage_state.status);
    for container in &stage_state.containers {
        println!(
            "  {} {} {}",
            "▸".cyan(),
            container.instance_id.dimmed(),
            container.status
        );
    }
}

/// Colorize instance status for display
fn colorize_status(status: PrivateComputationInstanceStatus) -> colored::ColoredString {
    let status_str = status.to_string();
    match status {
        PrivateComputationInstanceStatus::ReshardCompleted
        | PrivateComputationInstanceStatus::IdMatchingCompleted
        | PrivateComputationInstanceStatus::ComputationCompleted => status_str.green(),
        PrivateComputationInstanceStatus::ReshardFailed
        | PrivateComputationInstanceStatus::IdMatchingFailed
        | PrivateComputationInstanceStatus::ComputationFailed => status_str.red(),
        PrivateComputationInstanceStatus::Unknown => status_str.dimmed(),
        _ => status_str.cyan(),
    }
}
