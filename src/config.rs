//! Repository layout configuration.
//!
//! A [`DeployConfig`] is built once by the CLI and passed by reference to
//! every component; nothing reads ambient process state after that.

use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use crate::package::FileKind;
use crate::runtime::Runtime;

/// Interpreter used by command launchers unless overridden.
pub const DEFAULT_INTERPRETER: &str = "lua";

#[derive(Debug, Clone, PartialEq)]
pub struct DeployConfig {
    /// Repository root; install directories live under `<root>/rocks`.
    pub root: PathBuf,
    /// Deploy root for commands.
    pub bin_dir: PathBuf,
    /// Deploy root for platform-independent source modules.
    pub lua_dir: PathBuf,
    /// Deploy root for compiled modules.
    pub lib_dir: PathBuf,
    /// Interpreter that command launchers exec scripts with.
    pub interpreter: String,
}

impl DeployConfig {
    /// Standard layout under a single root:
    /// `<root>/bin`, `<root>/share/lua`, `<root>/lib/lua`.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            bin_dir: root.join("bin"),
            lua_dir: root.join("share").join("lua"),
            lib_dir: root.join("lib").join("lua"),
            interpreter: DEFAULT_INTERPRETER.to_string(),
            root,
        }
    }

    /// Build from CLI overrides, falling back to the default root.
    #[tracing::instrument(skip(runtime))]
    pub fn resolve<R: Runtime>(
        runtime: &R,
        root: Option<PathBuf>,
        bin_dir: Option<PathBuf>,
        lua_dir: Option<PathBuf>,
        lib_dir: Option<PathBuf>,
        interpreter: Option<String>,
    ) -> Result<Self> {
        let root = match root {
            Some(path) => path,
            None => default_root(runtime)?,
        };
        info!("Using repository root: {}", root.display());

        let mut config = Self::from_root(root);
        if let Some(dir) = bin_dir {
            config.bin_dir = dir;
        }
        if let Some(dir) = lua_dir {
            config.lua_dir = dir;
        }
        if let Some(dir) = lib_dir {
            config.lib_dir = dir;
        }
        if let Some(interpreter) = interpreter {
            config.interpreter = interpreter;
        }
        Ok(config)
    }

    /// Directory holding every package's version directories.
    pub fn rocks_dir(&self) -> PathBuf {
        self.root.join("rocks")
    }

    /// Shared directory that files of `kind` are deployed into.
    pub fn deploy_root(&self, kind: FileKind) -> &Path {
        match kind {
            FileKind::Command => &self.bin_dir,
            FileKind::Source => &self.lua_dir,
            FileKind::Compiled => &self.lib_dir,
        }
    }
}

/// `~/.rockyard` for regular users, a system location when privileged.
#[tracing::instrument(skip(runtime))]
pub fn default_root<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    if runtime.is_privileged() {
        Ok(system_root())
    } else {
        let home_dir = runtime
            .home_dir()
            .context("Could not find home directory")?;
        Ok(home_dir.join(".rockyard"))
    }
}

#[cfg(target_os = "macos")]
fn system_root() -> PathBuf {
    PathBuf::from("/opt/rockyard")
}

#[cfg(target_os = "windows")]
fn system_root() -> PathBuf {
    PathBuf::from(r"C:\ProgramData\rockyard")
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn system_root() -> PathBuf {
    PathBuf::from("/usr/local/rockyard")
}
