//! Plan command handler
//!
//! Prints what the reshard stage would launch for an instance.

use anyhow::Result;
use colored::*;
use pcs_service::stage::ReshardPlan;
use std::path::Path;

use crate::config::Config;
use crate::instance_file::load_instance;

/// Handle the plan command
pub fn handle_plan(instance_path: &Path, config: &Config) -> Result<()> {
    let instance = load_instance(instance_path)?;

    let plan = ReshardPlan::for_instance(
        &instance,
        &config.binaries,
        config.service.hmac_key.clone(),
    )?;

    println!(
        "{}",
        format!(
            "Reshard plan for {} ({}:{})",
            instance.instance_id, plan.binary_name, plan.binary_version
        )
        .bold()
    );
    println!();

    for (index, args) in plan.cmd_args_list().iter().enumerate() {
        println!("  {} container {}", "▸".cyan(), index);
        println!("    {}", args.dimmed());
    }

    Ok(())
}
