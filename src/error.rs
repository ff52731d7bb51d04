use std::path::{Component, Path};
use thiserror::Error;

/// Failures surfaced by the deployment engine.
///
/// Each variant carries the short contextual message added by the layer
/// that detected it; [`DeployError::Io`] keeps the underlying error chain.
#[derive(Error, Debug)]
pub enum DeployError {
    /// Malformed arguments passed to a public operation.
    #[error("invalid argument: {0}")]
    Validation(String),

    /// The instance has no manifest, so it is not a managed install.
    #[error("{0}")]
    NotFound(String),

    /// A deployed file exists but nobody is recorded as providing it.
    #[error("{0}")]
    ConflictTracking(String),

    #[error("{context}: {source:#}")]
    Io {
        context: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("hook {hook} failed: {source:#}")]
    Hook {
        hook: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type DeployResult<T> = Result<T, DeployError>;

/// Attach a contextual phrase to a runtime failure, turning it into [`DeployError::Io`].
pub trait IoContext<T> {
    fn io_context<F, S>(self, f: F) -> DeployResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IoContext<T> for anyhow::Result<T> {
    fn io_context<F, S>(self, f: F) -> DeployResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| DeployError::Io {
            context: f().into(),
            source,
        })
    }
}

/// Reject anything that is not exactly one plain path component: names,
/// versions and manifest path segments must never leave their directory.
pub fn validate_segment(kind: &str, value: &str) -> DeployResult<()> {
    let mut components = Path::new(value).components();
    let plain = matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none();

    if !plain || value == "." || value.contains('/') || value.contains('\\') {
        return Err(DeployError::Validation(format!(
            "{} {:?} is not a valid path segment",
            kind, value
        )));
    }
    Ok(())
}
