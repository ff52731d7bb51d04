use anyhow::Result;
use log::debug;

use crate::{config::DeployConfig, package::PackageRepository, runtime::Runtime};

/// Show the modules and commands an instance provides
#[tracing::instrument(skip(runtime, config))]
pub fn show<R: Runtime>(
    runtime: R,
    name: &str,
    version: &str,
    config: DeployConfig,
) -> Result<()> {
    debug!("Showing info for {} {}", name, version);
    let repo = PackageRepository::new(&runtime, &config);

    if !repo.is_installed(name, version) {
        anyhow::bail!("{} {} is not installed.", name, version);
    }

    println!("Package: {} {}", name, version);
    println!("Directory: {}", repo.install_dir(name, version).display());

    println!("\nModules:");
    let modules = repo.module_map(name, version);
    for (module, path) in &modules {
        println!("  {} -> {}", module, path);
    }
    if modules.is_empty() {
        println!("  (none)");
    }

    println!("\nCommands:");
    let commands = repo.command_map(name, version);
    for command in commands.keys() {
        println!("  {}", command);
    }
    if commands.is_empty() {
        println!("  (none)");
    }

    if repo.has_compiled_executables(name, version) {
        println!("\nProvides native executables.");
    }
    Ok(())
}
