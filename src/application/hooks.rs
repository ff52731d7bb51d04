//! Hook execution.

use log::{debug, info};

use crate::error::{DeployError, DeployResult};
use crate::package::HookDescriptor;
use crate::runtime::Runtime;

/// Hook run after an instance has been deployed.
pub const POST_INSTALL: &str = "post_install";

/// Run `hook` from `descriptor`, if the descriptor defines it.
///
/// A descriptor without a hook table, or without this hook, succeeds
/// without running anything.
pub fn run_hook<R: Runtime>(
    runtime: &R,
    descriptor: &HookDescriptor,
    hook: &str,
) -> DeployResult<()> {
    if descriptor.hooks().is_none() {
        debug!("Descriptor has no hook table");
        return Ok(());
    }
    let Some(command) = descriptor.command(hook) else {
        debug!("No {} hook to run", hook);
        return Ok(());
    };

    info!("Running {} hook: {}", hook, command);
    runtime.execute(command).map_err(|source| DeployError::Hook {
        hook: hook.to_string(),
        source,
    })
}
