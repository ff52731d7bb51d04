use log::debug;
use std::path::Path;

use super::{ConflictResolver, Placement};
use crate::error::{DeployResult, IoContext};
use crate::package::{FileTree, ProviderLedger, VersionCompare};
use crate::runtime::Runtime;

/// Projects one instance's file tree into a deploy root.
///
/// Traversal stops at the first failure; files placed before it stay placed.
pub struct Deployer<'a, R: Runtime, V: VersionCompare> {
    runtime: &'a R,
    resolver: ConflictResolver<'a, R, V>,
    name: &'a str,
    version: &'a str,
}

impl<'a, R: Runtime, V: VersionCompare> Deployer<'a, R, V> {
    pub fn new(runtime: &'a R, versions: &'a V, name: &'a str, version: &'a str) -> Self {
        Self {
            runtime,
            resolver: ConflictResolver::new(runtime, versions),
            name,
            version,
        }
    }

    /// Deploy `tree` from `source_root` into `deploy_root`.
    ///
    /// A tree with a segment that could leave either root is rejected before
    /// anything is touched.
    pub fn deploy(
        &self,
        ledger: &mut ProviderLedger,
        tree: &FileTree,
        source_root: &Path,
        deploy_root: &Path,
        placement: &dyn Placement,
    ) -> DeployResult<()> {
        tree.validate()?;
        self.deploy_tree(ledger, tree, source_root, deploy_root, placement)
    }

    fn deploy_tree(
        &self,
        ledger: &mut ProviderLedger,
        tree: &FileTree,
        source_root: &Path,
        deploy_root: &Path,
        placement: &dyn Placement,
    ) -> DeployResult<()> {
        self.runtime
            .create_dir_all(deploy_root)
            .io_context(|| format!("could not create {}", deploy_root.display()))?;

        for (segment, node) in tree.entries() {
            let source = source_root.join(segment);
            let target = deploy_root.join(segment);

            match node {
                FileTree::Directory(_) => {
                    self.deploy_tree(ledger, node, &source, &target, placement)?;
                    self.runtime
                        .remove_dir_if_empty(&source)
                        .io_context(|| format!("could not remove {}", source.display()))?;
                }
                FileTree::Leaf => self.deploy_file(ledger, &source, &target, placement)?,
            }
        }
        Ok(())
    }

    fn deploy_file(
        &self,
        ledger: &mut ProviderLedger,
        source: &Path,
        target: &Path,
        placement: &dyn Placement,
    ) -> DeployResult<()> {
        let destination = if self.runtime.exists(target) {
            self.resolver.resolve(ledger, self.name, self.version, target)?
        } else {
            target.to_path_buf()
        };

        debug!("Deploying {:?} to {:?}", source, destination);
        placement
            .place(source, &destination)
            .io_context(|| format!("could not deploy {}", destination.display()))?;

        if destination == target {
            ledger.record(target, self.name, self.version);
        }
        Ok(())
    }
}
