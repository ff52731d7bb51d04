//! Application layer - use cases that coordinate the repository and the
//! deployment engine.

mod deploy;
mod hooks;

pub use deploy::DeployAction;
pub use hooks::{POST_INSTALL, run_hook};
