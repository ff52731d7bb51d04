use anyhow::Result;
use log::debug;

use crate::{config::DeployConfig, package::PackageRepository, runtime::Runtime};

/// List installed instances, of every package or of one
#[tracing::instrument(skip(runtime, config))]
pub fn list<R: Runtime>(runtime: R, name: Option<&str>, config: DeployConfig) -> Result<()> {
    debug!("Listing packages from {:?}", config.rocks_dir());
    let repo = PackageRepository::new(&runtime, &config);

    let packages = match name {
        Some(name) => vec![name.to_string()],
        None => repo.list_packages()?,
    };

    let mut found = 0;
    for package in &packages {
        for version in repo.list_versions(package)? {
            println!("{} {}", package, version);
            found += 1;
        }
    }
    debug!("Found {} instance(s)", found);

    if found == 0 {
        match name {
            Some(name) => println!("{} is not installed.", name),
            None => println!("No packages installed."),
        }
    }
    Ok(())
}
