//! Package management module
//!
//! Installed instances, their manifests and hook descriptors, the naming
//! rules for deployed files, version ordering and provider records.

mod descriptor;
mod manifest;
mod naming;
mod providers;
mod repository;
mod tree;
mod version;

pub use descriptor::{HookDescriptor, substitute};
pub use manifest::{FileKind, Manifest};
pub use naming::{module_id, versioned_name};
pub use providers::{Provider, ProviderLedger};
pub use repository::PackageRepository;
pub use tree::FileTree;
pub use version::{RockVersionCompare, VersionCompare};

#[cfg(test)]
pub use version::MockVersionCompare;
