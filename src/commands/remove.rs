use anyhow::Result;
use log::debug;

use crate::application::DeployAction;
use crate::config::DeployConfig;
use crate::package::RockVersionCompare;
use crate::runtime::Runtime;

/// Undeploy an instance and delete its install directory
#[tracing::instrument(skip(runtime, config))]
pub fn remove<R: Runtime>(
    runtime: R,
    name: &str,
    version: &str,
    config: DeployConfig,
) -> Result<()> {
    debug!("Using repository root: {:?}", config.root);
    let action = DeployAction::new(&runtime, &config, &RockVersionCompare);

    action.remove_all(name, version)?;
    println!("Removed {} {}", name, version);
    Ok(())
}
