//! Deployment engine.
//!
//! Projects instances' file trees into the shared deploy roots and retracts
//! them again, keeping at most one unversioned file per deployed path.
//!
//! - `resolver` - ownership decision for an occupied path
//! - `deployer` - recursive placement of one file tree
//! - `undeployer` - recursive removal of one file tree
//! - `placement` - how a single file is materialized (move, launcher, binary copy)

mod deployer;
mod placement;
mod resolver;
mod undeployer;

pub use deployer::Deployer;
pub use placement::{CommandPlacement, MovePlacement, Placement, launcher};
pub use resolver::ConflictResolver;
pub use undeployer::Undeployer;
