use anyhow::Result;
use log::debug;

use crate::application::{DeployAction, POST_INSTALL};
use crate::config::DeployConfig;
use crate::package::RockVersionCompare;
use crate::runtime::Runtime;

/// Deploy an installed instance, then run its post_install hook
#[tracing::instrument(skip(runtime, config))]
pub fn deploy<R: Runtime>(
    runtime: R,
    name: &str,
    version: &str,
    config: DeployConfig,
) -> Result<()> {
    debug!("Using repository root: {:?}", config.root);
    let action = DeployAction::new(&runtime, &config, &RockVersionCompare);

    action.deploy_all(name, version)?;
    println!("Deployed {} {}", name, version);

    if let Some(descriptor) = action.load_hooks(name, version)? {
        action.run_hook(&descriptor, POST_INSTALL)?;
    }
    Ok(())
}
