use log::{debug, warn};
use std::path::Path;

use crate::error::{DeployResult, IoContext};
use crate::package::{FileTree, ProviderLedger, versioned_name};
use crate::runtime::Runtime;

/// Retracts one instance's file tree from a deploy root.
///
/// Only files this instance owns are deleted: its own versioned copy, or
/// the unversioned file when no other provider is recorded for it. A
/// vacated unversioned slot is left empty; other instances' versioned
/// copies are not promoted into it.
pub struct Undeployer<'a, R: Runtime> {
    runtime: &'a R,
    name: &'a str,
    version: &'a str,
}

impl<'a, R: Runtime> Undeployer<'a, R> {
    pub fn new(runtime: &'a R, name: &'a str, version: &'a str) -> Self {
        Self {
            runtime,
            name,
            version,
        }
    }

    /// Remove this instance's files of `tree` from `deploy_root`.
    ///
    /// A tree with a segment that could leave the root is rejected before
    /// anything is removed.
    pub fn undeploy(
        &self,
        ledger: &mut ProviderLedger,
        tree: &FileTree,
        deploy_root: &Path,
    ) -> DeployResult<()> {
        tree.validate()?;
        self.undeploy_tree(ledger, tree, deploy_root)
    }

    fn undeploy_tree(
        &self,
        ledger: &mut ProviderLedger,
        tree: &FileTree,
        deploy_root: &Path,
    ) -> DeployResult<()> {
        for (segment, node) in tree.entries() {
            let target = deploy_root.join(segment);

            match node {
                FileTree::Directory(_) => {
                    self.undeploy_tree(ledger, node, &target)?;
                    self.runtime
                        .remove_dir_if_empty(&target)
                        .io_context(|| format!("could not remove {}", target.display()))?;
                }
                FileTree::Leaf => self.undeploy_file(ledger, &target)?,
            }
        }
        Ok(())
    }

    fn undeploy_file(&self, ledger: &mut ProviderLedger, target: &Path) -> DeployResult<()> {
        let versioned = versioned_name(target, self.name, self.version);
        if self.runtime.exists(&versioned) {
            debug!("Removing versioned {:?}", versioned);
            return self
                .runtime
                .remove_file(&versioned)
                .io_context(|| format!("could not remove {}", versioned.display()));
        }

        if !self.runtime.exists(target) {
            debug!("{:?} is already gone", target);
            return Ok(());
        }

        if let Ok(provider) = ledger.find_current_provider(target)
            && (provider.name != self.name || provider.version != self.version)
        {
            warn!(
                "Leaving {} in place: it is provided by {} {}",
                target.display(),
                provider.name,
                provider.version
            );
            return Ok(());
        }

        debug!("Removing {:?}", target);
        self.runtime
            .remove_file(target)
            .io_context(|| format!("could not remove {}", target.display()))?;
        ledger.forget(target);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeployError;
    use crate::runtime::{MockRuntime, RealRuntime};
    use serde_json::json;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn tree(value: serde_json::Value) -> FileTree {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_removes_owned_files_and_empty_dirs() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let root = dir.path().join("lua");
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("a.lua"), "a").unwrap();
        fs::write(root.join("sub").join("b.lua"), "b").unwrap();

        let mut ledger = ProviderLedger::empty(dir.path().join("providers.json"));
        ledger.record(&root.join("a.lua"), "pkg", "1.0-1");
        ledger.record(&root.join("sub").join("b.lua"), "pkg", "1.0-1");

        Undeployer::new(&runtime, "pkg", "1.0-1")
            .undeploy(
                &mut ledger,
                &tree(json!({"a.lua": "x", "sub": {"b.lua": "y"}})),
                &root,
            )
            .unwrap();

        assert!(!root.join("a.lua").exists());
        assert!(!root.join("sub").exists());
        assert!(root.exists());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_versioned_copy_removed_occupant_untouched() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let root = dir.path().join("lua");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("m.lua"), "winner").unwrap();
        fs::write(root.join("pkg_v1_d0-m.lua"), "loser").unwrap();

        let mut ledger = ProviderLedger::empty(dir.path().join("providers.json"));
        ledger.record(&root.join("m.lua"), "pkg", "2.0");

        Undeployer::new(&runtime, "pkg", "1.0")
            .undeploy(&mut ledger, &tree(json!({"m.lua": "x"})), &root)
            .unwrap();

        assert!(!root.join("pkg_v1_d0-m.lua").exists());
        assert_eq!(fs::read_to_string(root.join("m.lua")).unwrap(), "winner");
        assert_eq!(
            ledger.find_current_provider(&root.join("m.lua")).unwrap().version,
            "2.0"
        );
    }

    #[test]
    fn test_vacated_slot_is_not_promoted() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let root = dir.path().join("bin");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("tool"), "new").unwrap();
        fs::write(root.join("old_v1_d0-tool"), "old").unwrap();

        let mut ledger = ProviderLedger::empty(dir.path().join("providers.json"));
        ledger.record(&root.join("tool"), "new", "1.0");

        Undeployer::new(&runtime, "new", "1.0")
            .undeploy(&mut ledger, &tree(json!({"tool": "x"})), &root)
            .unwrap();

        assert!(!root.join("tool").exists());
        assert!(root.join("old_v1_d0-tool").exists());
    }

    #[test_log::test]
    fn test_file_of_other_provider_is_kept() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let root = dir.path().join("lua");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("m.lua"), "theirs").unwrap();

        let mut ledger = ProviderLedger::empty(dir.path().join("providers.json"));
        ledger.record(&root.join("m.lua"), "other", "1.0");

        Undeployer::new(&runtime, "pkg", "1.0")
            .undeploy(&mut ledger, &tree(json!({"m.lua": "x"})), &root)
            .unwrap();

        assert!(root.join("m.lua").exists());
    }

    #[test]
    fn test_escaping_segments_are_rejected_before_removing() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let root = dir.path().join("lua");
        let victim = dir.path().join("victim.txt");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("a.lua"), "a").unwrap();
        fs::write(&victim, "precious").unwrap();

        let undeployer = Undeployer::new(&runtime, "evil", "1.0");
        for bad in [
            json!({"a.lua": "x", (victim.display().to_string()): "y"}),
            json!({"a.lua": "x", "..": {"victim.txt": "y"}}),
        ] {
            let mut ledger = ProviderLedger::empty(dir.path().join("providers.json"));
            let err = undeployer
                .undeploy(&mut ledger, &tree(bad), &root)
                .unwrap_err();
            assert!(matches!(err, DeployError::Validation(_)));
        }

        assert_eq!(fs::read_to_string(&victim).unwrap(), "precious");
        assert!(root.join("a.lua").exists());
    }

    #[test]
    fn test_missing_files_are_skipped() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let mut ledger = ProviderLedger::empty(dir.path().join("providers.json"));

        Undeployer::new(&runtime, "pkg", "1.0")
            .undeploy(
                &mut ledger,
                &tree(json!({"gone.lua": "x", "sub": {"gone.lua": "y"}})),
                &dir.path().join("lua"),
            )
            .unwrap();
    }

    #[test]
    fn test_failure_aborts_remaining_entries() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|p| !p.to_string_lossy().contains("pkg_"));
        runtime
            .expect_remove_file()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("busy")));

        let mut ledger = ProviderLedger::empty(PathBuf::from("/r/providers.json"));
        let err = Undeployer::new(&runtime, "pkg", "1.0")
            .undeploy(
                &mut ledger,
                &tree(json!({"a.lua": "x", "b.lua": "y"})),
                Path::new("/lua"),
            )
            .unwrap_err();

        assert!(matches!(err, DeployError::Io { .. }));
        assert!(err.to_string().starts_with("could not remove /lua/a.lua"));
    }
}
