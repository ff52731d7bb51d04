//! Read-only queries over the installed instances of a repository.

use anyhow::Result;
use log::warn;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::DeployConfig;
use crate::runtime::Runtime;

use super::{FileKind, FileTree, Manifest, ProviderLedger, module_id, versioned_name};

/// Repository of locally installed package instances.
///
/// Layout under the configured root:
/// - `rocks/<name>/<version>/` - install directory of one instance
/// - `rocks/<name>/<version>/rock_manifest.json` - its manifest
/// - `rocks/providers.json` - provider records of the deploy roots
pub struct PackageRepository<'a, R: Runtime> {
    runtime: &'a R,
    config: &'a DeployConfig,
}

impl<'a, R: Runtime> PackageRepository<'a, R> {
    pub fn new(runtime: &'a R, config: &'a DeployConfig) -> Self {
        Self { runtime, config }
    }

    pub fn config(&self) -> &DeployConfig {
        self.config
    }

    /// Returns: `<root>/rocks/<name>`
    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.config.rocks_dir().join(name)
    }

    /// Returns: `<root>/rocks/<name>/<version>`
    pub fn install_dir(&self, name: &str, version: &str) -> PathBuf {
        self.package_dir(name).join(version)
    }

    /// Returns: `<root>/rocks/<name>/<version>/<bin|lua|lib>`
    pub fn source_dir(&self, name: &str, version: &str, kind: FileKind) -> PathBuf {
        self.install_dir(name, version).join(kind.dir_name())
    }

    pub fn manifest_path(&self, name: &str, version: &str) -> PathBuf {
        self.install_dir(name, version).join(Manifest::FILE_NAME)
    }

    pub fn providers_path(&self) -> PathBuf {
        self.config.rocks_dir().join(ProviderLedger::FILE_NAME)
    }

    /// Names of every package with a record directory, sorted.
    pub fn list_packages(&self) -> Result<Vec<String>> {
        self.subdirectories(self.config.rocks_dir())
    }

    /// Installed versions of a package, sorted; empty when none.
    pub fn list_versions(&self, name: &str) -> Result<Vec<String>> {
        self.subdirectories(self.package_dir(name))
    }

    fn subdirectories(&self, dir: PathBuf) -> Result<Vec<String>> {
        if !self.runtime.is_dir(&dir) {
            return Ok(vec![]);
        }

        let mut names = Vec::new();
        for entry in self.runtime.read_dir(&dir)? {
            if let Some(name) = entry.file_name().and_then(|n| n.to_str())
                && self.runtime.is_dir(&entry)
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn is_installed(&self, name: &str, version: &str) -> bool {
        self.runtime.is_dir(&self.install_dir(name, version))
    }

    /// Load an instance's manifest; `None` for installs without one.
    pub fn load_manifest(&self, name: &str, version: &str) -> Result<Option<Manifest>> {
        Manifest::load(self.runtime, &self.manifest_path(name, version))
    }

    /// Manifest for read-only queries: load failures are logged and treated as absent.
    fn manifest_or_default(&self, name: &str, version: &str) -> Manifest {
        match self.load_manifest(name, version) {
            Ok(manifest) => manifest.unwrap_or_default(),
            Err(e) => {
                warn!("Ignoring unreadable manifest of {} {}: {:#}", name, version, e);
                Manifest::default()
            }
        }
    }

    /// Module identifier -> path relative to its deploy root, over source and
    /// compiled modules.
    ///
    /// When two paths map to the same identifier the one visited last wins;
    /// entries are visited in key order, source modules before compiled ones.
    pub fn module_map(&self, name: &str, version: &str) -> BTreeMap<String, String> {
        let manifest = self.manifest_or_default(name, version);
        let mut modules = BTreeMap::new();
        for kind in [FileKind::Source, FileKind::Compiled] {
            if let Some(tree) = manifest.tree(kind) {
                for path in tree.leaf_paths() {
                    modules.insert(module_id(&path), path);
                }
            }
        }
        modules
    }

    /// Command name -> path relative to the commands deploy root.
    pub fn command_map(&self, name: &str, version: &str) -> BTreeMap<String, String> {
        let manifest = self.manifest_or_default(name, version);
        manifest
            .tree(FileKind::Command)
            .map(FileTree::leaf_paths)
            .unwrap_or_default()
            .into_iter()
            .map(|path| (path.clone(), path))
            .collect()
    }

    /// Whether any of the instance's deployed commands is a native binary
    /// rather than a script launcher.
    pub fn has_compiled_executables(&self, name: &str, version: &str) -> bool {
        let manifest = self.manifest_or_default(name, version);
        let Some(tree) = manifest.tree(FileKind::Command).filter(|tree| !tree.is_empty()) else {
            return false;
        };

        tree.leaf_paths().iter().any(|path| {
            let target = self.config.bin_dir.join(path);
            let versioned = versioned_name(&target, name, version);
            let deployed = if self.runtime.exists(&versioned) {
                versioned
            } else {
                target
            };
            self.runtime.is_native_binary(&deployed)
        })
    }
}
