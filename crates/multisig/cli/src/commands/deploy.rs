//! Deploy command

use super::InstanceSummary;
use crate::error::CliResult;
use crate::output::{print_structured, OutputFormat};
use colored::Colorize;
use multisig_runtime::{FactoryConfig, InstanceFactory};
use multisig_types::Identity;
use std::path::Path;
use tracing::info;

/// Identity of the factory the CLI deploys through
pub const CLI_FACTORY: &str = "multisig-cli";

/// Create every instance the config file describes
pub fn execute(config_path: &Path, format: OutputFormat) -> CliResult<()> {
    let config = FactoryConfig::load(config_path)?;
    let mut factory = InstanceFactory::new(Identity::new(CLI_FACTORY));

    let mut summaries = Vec::with_capacity(config.instances.len());
    for deployment in &config.instances {
        let handle = factory.create_instance_with_master(deployment)?;
        let wallet = factory.instance(&handle)?;
        summaries.push(InstanceSummary::of(wallet, deployment.label.clone()));
    }

    info!(count = factory.count(), "Deployment finished");

    if print_structured(format, &summaries)? {
        return Ok(());
    }

    println!(
        "{} {} instance(s)",
        "Deployed".green().bold(),
        summaries.len()
    );
    println!("{}", "=".repeat(60));
    for summary in &summaries {
        summary.print_table();
        println!();
    }
    Ok(())
}
