use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::{DeployResult, validate_segment};

/// A manifest file tree: directories map path segments to nested nodes,
/// leaves only mark "a file lives here".
///
/// Any JSON object deserializes as a [`FileTree::Directory`]; every other
/// JSON value (usually a checksum string) is a [`FileTree::Leaf`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum FileTree {
    Leaf,
    Directory(BTreeMap<String, FileTree>),
}

impl From<serde_json::Value> for FileTree {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(entries) => FileTree::Directory(
                entries
                    .into_iter()
                    .map(|(segment, node)| (segment, FileTree::from(node)))
                    .collect(),
            ),
            _ => FileTree::Leaf,
        }
    }
}

impl FileTree {
    /// Entries of a directory; a leaf has none.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &FileTree)> {
        let entries = match self {
            FileTree::Directory(entries) => Some(entries),
            FileTree::Leaf => None,
        };
        entries.into_iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    /// Check that every segment, at any depth, is one plain path component,
    /// so joining the tree onto a root can never leave that root.
    pub fn validate(&self) -> DeployResult<()> {
        for (segment, node) in self.entries() {
            validate_segment("manifest path segment", segment)?;
            node.validate()?;
        }
        Ok(())
    }

    /// Relative paths of every leaf in traversal order, segments joined with `/`.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        collect_leaves(self, "", &mut paths);
        paths
    }
}

fn collect_leaves(tree: &FileTree, prefix: &str, out: &mut Vec<String>) {
    for (segment, node) in tree.entries() {
        match node {
            FileTree::Directory(_) => {
                collect_leaves(node, &format!("{}{}/", prefix, segment), out)
            }
            FileTree::Leaf => out.push(format!("{}{}", prefix, segment)),
        }
    }
}
