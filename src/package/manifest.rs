use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use super::FileTree;
use crate::error::DeployResult;
use crate::runtime::Runtime;

/// The three kinds of files an instance can deploy, in deployment order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Command-line scripts and executables.
    Command,
    /// Platform-independent source modules.
    Source,
    /// Platform-specific compiled modules.
    Compiled,
}

impl FileKind {
    pub const ALL: [FileKind; 3] = [FileKind::Command, FileKind::Source, FileKind::Compiled];

    /// Key in the manifest and subdirectory name inside an install directory.
    pub fn dir_name(self) -> &'static str {
        match self {
            FileKind::Command => "bin",
            FileKind::Source => "lua",
            FileKind::Compiled => "lib",
        }
    }
}

/// Per-instance manifest listing the files it deploys, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub bin: Option<FileTree>,
    #[serde(default)]
    pub lua: Option<FileTree>,
    #[serde(default)]
    pub lib: Option<FileTree>,
}

impl Manifest {
    pub const FILE_NAME: &'static str = "rock_manifest.json";

    pub fn tree(&self, kind: FileKind) -> Option<&FileTree> {
        match kind {
            FileKind::Command => self.bin.as_ref(),
            FileKind::Source => self.lua.as_ref(),
            FileKind::Compiled => self.lib.as_ref(),
        }
    }

    /// Validate the trees of every kind; see [`FileTree::validate`].
    pub fn validate(&self) -> DeployResult<()> {
        FileKind::ALL
            .into_iter()
            .filter_map(|kind| self.tree(kind))
            .try_for_each(FileTree::validate)
    }

    /// Load a manifest; `None` when the file does not exist.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Option<Self>> {
        if !runtime.exists(path) {
            return Ok(None);
        }
        let content = runtime.read_to_string(path)?;
        let manifest = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse manifest {:?}", path))?;
        Ok(Some(manifest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use std::path::PathBuf;

    #[test]
    fn test_load_missing_manifest() {
        let mut runtime = MockRuntime::new();
        let path = PathBuf::from("/root/rocks/pkg/1.0-1/rock_manifest.json");
        runtime
            .expect_exists()
            .with(eq(path.clone()))
            .returning(|_| false);

        assert_eq!(Manifest::load(&runtime, &path).unwrap(), None);
    }

    #[test]
    fn test_load_partial_manifest() {
        let mut runtime = MockRuntime::new();
        let path = PathBuf::from("/root/rocks/pkg/1.0-1/rock_manifest.json");
        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_read_to_string()
            .with(eq(path.clone()))
            .returning(|_| Ok(r#"{"lua": {"a.lua": "abc", "sub": {"b.lua": "def"}}}"#.into()));

        let manifest = Manifest::load(&runtime, &path).unwrap().unwrap();
        assert!(manifest.tree(FileKind::Command).is_none());
        assert!(manifest.tree(FileKind::Compiled).is_none());
        assert_eq!(
            manifest.tree(FileKind::Source).unwrap().leaf_paths(),
            vec!["a.lua", "sub/b.lua"]
        );
    }

    #[test]
    fn test_load_corrupt_manifest() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_read_to_string()
            .returning(|_| Ok("not json".into()));

        let err = Manifest::load(&runtime, Path::new("/m.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to parse manifest"));
    }

    #[test]
    fn test_kind_order_and_names() {
        let names: Vec<_> = FileKind::ALL.iter().map(|k| k.dir_name()).collect();
        assert_eq!(names, vec!["bin", "lua", "lib"]);
    }
}
