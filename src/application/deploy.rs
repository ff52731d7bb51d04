//! Deploy action - sequences deployment and removal across the three file kinds.

use log::{debug, info};
use std::collections::BTreeMap;

use crate::config::DeployConfig;
use crate::deploy::{CommandPlacement, Deployer, MovePlacement, Placement, Undeployer};
use crate::error::{DeployError, DeployResult, IoContext, validate_segment};
use crate::package::{
    FileKind, HookDescriptor, Manifest, PackageRepository, ProviderLedger, VersionCompare,
};
use crate::runtime::Runtime;

use super::hooks::run_hook;

/// Deploy action - deploys, removes and runs hooks for package instances.
pub struct DeployAction<'a, R: Runtime, V: VersionCompare> {
    runtime: &'a R,
    versions: &'a V,
    repo: PackageRepository<'a, R>,
}

impl<'a, R: Runtime, V: VersionCompare> DeployAction<'a, R, V> {
    pub fn new(runtime: &'a R, config: &'a DeployConfig, versions: &'a V) -> Self {
        Self {
            runtime,
            versions,
            repo: PackageRepository::new(runtime, config),
        }
    }

    pub fn repo(&self) -> &PackageRepository<'a, R> {
        &self.repo
    }

    fn require_manifest(&self, name: &str, version: &str) -> DeployResult<Manifest> {
        validate_segment("package name", name)?;
        validate_segment("version", version)?;

        let manifest = self
            .repo
            .load_manifest(name, version)
            .io_context(|| format!("could not load manifest of {} {}", name, version))?
            .ok_or_else(|| {
                DeployError::NotFound(format!(
                    "{} {} has no manifest; it is not a managed install",
                    name, version
                ))
            })?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn load_ledger(&self) -> DeployResult<ProviderLedger> {
        ProviderLedger::load(self.runtime, &self.repo.providers_path())
            .io_context(|| "could not load provider records")
    }

    /// Deploy commands, source modules and compiled modules, in that order.
    ///
    /// Provider records are saved even when a kind fails part way, so the
    /// files already placed stay tracked.
    pub fn deploy_all(&self, name: &str, version: &str) -> DeployResult<()> {
        let manifest = self.require_manifest(name, version)?;
        let mut ledger = self.load_ledger()?;
        info!("Deploying {} {}", name, version);

        let deployed = self.deploy_kinds(&mut ledger, &manifest, name, version);
        let saved = ledger
            .save(self.runtime)
            .io_context(|| "could not save provider records");
        deployed?;
        saved
    }

    fn deploy_kinds(
        &self,
        ledger: &mut ProviderLedger,
        manifest: &Manifest,
        name: &str,
        version: &str,
    ) -> DeployResult<()> {
        let config = self.repo.config();
        let deployer = Deployer::new(self.runtime, self.versions, name, version);
        let commands = CommandPlacement::new(self.runtime, &config.interpreter);
        let modules = MovePlacement::new(self.runtime);

        for kind in FileKind::ALL {
            let Some(tree) = manifest.tree(kind) else {
                continue;
            };
            let placement: &dyn Placement = match kind {
                FileKind::Command => &commands,
                FileKind::Source | FileKind::Compiled => &modules,
            };
            debug!("Deploying {} files of {} {}", kind.dir_name(), name, version);
            deployer.deploy(
                ledger,
                tree,
                &self.repo.source_dir(name, version, kind),
                config.deploy_root(kind),
                placement,
            )?;
        }
        Ok(())
    }

    /// Undeploy every kind, then delete the install directory and, when no
    /// versions remain, the package's record directory.
    ///
    /// Nothing is deleted from the install tree if undeploying fails.
    pub fn remove_all(&self, name: &str, version: &str) -> DeployResult<()> {
        let manifest = self.require_manifest(name, version)?;
        let mut ledger = self.load_ledger()?;
        info!("Removing {} {}", name, version);

        let undeployed = self.undeploy_kinds(&mut ledger, &manifest, name, version);
        let saved = ledger
            .save(self.runtime)
            .io_context(|| "could not save provider records");
        undeployed?;
        saved?;

        let install_dir = self.repo.install_dir(name, version);
        self.runtime
            .remove_dir_all(&install_dir)
            .io_context(|| format!("could not remove {}", install_dir.display()))?;

        let remaining = self
            .repo
            .list_versions(name)
            .io_context(|| format!("could not list versions of {}", name))?;
        if remaining.is_empty() {
            let package_dir = self.repo.package_dir(name);
            debug!("No versions of {} left, removing {:?}", name, package_dir);
            if self.runtime.exists(&package_dir) {
                self.runtime
                    .remove_dir_all(&package_dir)
                    .io_context(|| format!("could not remove {}", package_dir.display()))?;
            }
        }
        Ok(())
    }

    fn undeploy_kinds(
        &self,
        ledger: &mut ProviderLedger,
        manifest: &Manifest,
        name: &str,
        version: &str,
    ) -> DeployResult<()> {
        let config = self.repo.config();
        let undeployer = Undeployer::new(self.runtime, name, version);

        for kind in FileKind::ALL {
            if let Some(tree) = manifest.tree(kind) {
                undeployer.undeploy(ledger, tree, config.deploy_root(kind))?;
            }
        }
        Ok(())
    }

    /// Load the instance's hook descriptor with the repository variables
    /// (`PREFIX`, `LUADIR`, `LIBDIR`, `BINDIR`, `ROCKS_TREE`) substituted.
    pub fn load_hooks(&self, name: &str, version: &str) -> DeployResult<Option<HookDescriptor>> {
        validate_segment("package name", name)?;
        validate_segment("version", version)?;

        let config = self.repo.config();
        let install_dir = self.repo.install_dir(name, version);
        let builtins: BTreeMap<String, String> = [
            ("PREFIX", &install_dir),
            ("LUADIR", &config.lua_dir),
            ("LIBDIR", &config.lib_dir),
            ("BINDIR", &config.bin_dir),
            ("ROCKS_TREE", &config.root),
        ]
        .into_iter()
        .map(|(key, path)| (key.to_string(), path.to_string_lossy().into_owned()))
        .collect();

        let path = install_dir.join(HookDescriptor::FILE_NAME);
        HookDescriptor::load(self.runtime, &path, &builtins)
            .io_context(|| format!("could not load hooks of {} {}", name, version))
    }

    pub fn run_hook(&self, descriptor: &HookDescriptor, hook: &str) -> DeployResult<()> {
        run_hook(self.runtime, descriptor, hook)
    }
}
