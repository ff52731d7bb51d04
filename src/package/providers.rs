//! Provider records: which instance occupies each unversioned deployed path.

use anyhow::{Context, Result, anyhow};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// The `(name, version)` of an instance occupying a deployed path.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    pub name: String,
    pub version: String,
}

impl Provider {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct LedgerFile {
    #[serde(default)]
    providers: BTreeMap<String, Provider>,
}

/// Persisted mapping from unversioned deployed path to its provider.
///
/// Changes stay in memory until [`ProviderLedger::save`] is called.
#[derive(Debug)]
pub struct ProviderLedger {
    path: PathBuf,
    providers: BTreeMap<String, Provider>,
    dirty: bool,
}

impl ProviderLedger {
    pub const FILE_NAME: &'static str = "providers.json";

    /// An empty ledger that will be written to `path`.
    pub fn empty(path: PathBuf) -> Self {
        Self {
            path,
            providers: BTreeMap::new(),
            dirty: false,
        }
    }

    /// Load the ledger at `path`; a missing file is an empty ledger.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        if !runtime.exists(path) {
            return Ok(Self::empty(path.to_path_buf()));
        }
        let content = runtime.read_to_string(path)?;
        let file: LedgerFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse provider records {:?}", path))?;
        Ok(Self {
            path: path.to_path_buf(),
            providers: file.providers,
            dirty: false,
        })
    }

    /// Write the ledger back if anything changed since it was loaded.
    pub fn save<R: Runtime>(&mut self, runtime: &R) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent()
            && !runtime.exists(parent)
        {
            runtime.create_dir_all(parent)?;
        }

        debug!("Saving {} provider record(s) to {:?}", self.len(), self.path);
        let file = LedgerFile {
            providers: self.providers.clone(),
        };
        let content = serde_json::to_string_pretty(&file)?;
        runtime
            .write(&self.path, content.as_bytes())
            .with_context(|| format!("Failed to save provider records to {:?}", self.path))?;
        self.dirty = false;
        Ok(())
    }

    /// The instance currently occupying the unversioned `target`.
    pub fn find_current_provider(&self, target: &Path) -> Result<&Provider> {
        self.providers
            .get(&key(target))
            .ok_or_else(|| anyhow!("no provider is recorded for {}", target.display()))
    }

    pub fn record(&mut self, target: &Path, name: &str, version: &str) {
        debug!("Recording {} {} as provider of {:?}", name, version, target);
        self.providers
            .insert(key(target), Provider::new(name, version));
        self.dirty = true;
    }

    pub fn forget(&mut self, target: &Path) -> Option<Provider> {
        let removed = self.providers.remove(&key(target));
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

fn key(target: &Path) -> String {
    target.to_string_lossy().into_owned()
}
