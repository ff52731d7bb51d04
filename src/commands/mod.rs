//! CLI command handlers. Each takes an already resolved
//! [`DeployConfig`](crate::config::DeployConfig) and prints its results.

mod deploy;
mod list;
mod remove;
mod show;

pub use deploy::deploy;
pub use list::list;
pub use remove::remove;
pub use show::show;
