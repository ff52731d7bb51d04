use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::error::{DeployError, DeployResult, IoContext};
use crate::package::{ProviderLedger, VersionCompare, versioned_name};
use crate::runtime::Runtime;

/// Decides who owns an occupied unversioned path.
///
/// A different package always displaces the current provider; the same
/// package displaces it only with a strictly newer version. The loser keeps
/// its file under its own versioned name.
pub struct ConflictResolver<'a, R: Runtime, V: VersionCompare> {
    runtime: &'a R,
    versions: &'a V,
}

impl<'a, R: Runtime, V: VersionCompare> ConflictResolver<'a, R, V> {
    pub fn new(runtime: &'a R, versions: &'a V) -> Self {
        Self { runtime, versions }
    }

    /// Resolve a collision at the existing `target` for instance `(name, version)`.
    ///
    /// Returns the path the incoming file must be placed at: `target` itself
    /// when the incoming instance wins (the current occupant has then been
    /// moved to its versioned name), or the incoming instance's versioned name.
    pub fn resolve(
        &self,
        ledger: &mut ProviderLedger,
        name: &str,
        version: &str,
        target: &Path,
    ) -> DeployResult<PathBuf> {
        let current = ledger
            .find_current_provider(target)
            .map_err(|e| DeployError::ConflictTracking(e.to_string()))?
            .clone();

        let wins = name != current.name
            || self.versions.is_newer(version, &current.version);

        if !wins {
            let versioned = versioned_name(target, name, version);
            info!(
                "{} stays with {} {}; installing {} {} as {}",
                target.display(),
                current.name,
                current.version,
                name,
                version,
                versioned.display()
            );
            return Ok(versioned);
        }

        let relocated = versioned_name(target, &current.name, &current.version);
        info!(
            "{} {} takes {} from {} {}",
            name,
            version,
            target.display(),
            current.name,
            current.version
        );
        if self.runtime.exists(&relocated) {
            debug!("Replacing stale {:?}", relocated);
            self.runtime
                .remove_file(&relocated)
                .io_context(|| "cannot install new version")?;
        }
        self.runtime
            .rename(target, &relocated)
            .io_context(|| "cannot install new version")?;
        ledger.forget(target);

        Ok(target.to_path_buf())
    }
}
