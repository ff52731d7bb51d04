//! Strategies that materialize one file at its deployed path.

use anyhow::Result;
use log::debug;
use std::path::Path;

use crate::runtime::Runtime;

/// Places a single source file at its final deployed path.
pub trait Placement {
    fn place(&self, source: &Path, target: &Path) -> Result<()>;
}

/// Moves the file out of the install directory. Used for modules.
pub struct MovePlacement<'a, R: Runtime> {
    runtime: &'a R,
}

impl<'a, R: Runtime> MovePlacement<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }
}

impl<R: Runtime> Placement for MovePlacement<'_, R> {
    fn place(&self, source: &Path, target: &Path) -> Result<()> {
        self.runtime.rename(source, target)
    }
}

/// Installs commands: scripts get a launcher that runs them with the
/// interpreter, anything else is copied as a binary. The source stays in
/// the install directory.
pub struct CommandPlacement<'a, R: Runtime> {
    runtime: &'a R,
    interpreter: &'a str,
}

impl<'a, R: Runtime> CommandPlacement<'a, R> {
    pub fn new(runtime: &'a R, interpreter: &'a str) -> Self {
        Self {
            runtime,
            interpreter,
        }
    }

    /// A `.lua` file, or anything starting with a `#!` line.
    pub fn is_script(&self, source: &Path) -> Result<bool> {
        if source.extension().is_some_and(|ext| ext == "lua") {
            return Ok(true);
        }
        Ok(self.runtime.read_prefix(source, 2)? == b"#!")
    }

    fn wrap_script(&self, source: &Path, target: &Path) -> Result<()> {
        debug!("Writing launcher {:?} for {:?}", target, source);
        let content = launcher(self.interpreter, source, target);
        self.runtime.write(target, content.as_bytes())?;
        self.runtime.set_permissions(target, 0o755)
    }

    fn copy_binary(&self, source: &Path, target: &Path) -> Result<()> {
        debug!("Copying binary {:?} to {:?}", source, target);
        self.runtime.copy(source, target)?;
        self.runtime.set_permissions(target, 0o755)
    }
}

impl<R: Runtime> Placement for CommandPlacement<'_, R> {
    fn place(&self, source: &Path, target: &Path) -> Result<()> {
        if self.is_script(source)? {
            self.wrap_script(source, target)
        } else {
            self.copy_binary(source, target)
        }
    }
}

/// POSIX shell launcher that execs `interpreter` on `script`.
///
/// The script is addressed relative to the launcher's own directory when
/// a relative path exists, so the repository root can be relocated.
pub fn launcher(interpreter: &str, script: &Path, launcher_path: &Path) -> String {
    let relative = launcher_path
        .parent()
        .and_then(|dir| pathdiff::diff_paths(script, dir))
        .filter(|p| p.is_relative());

    let script_arg = match relative {
        Some(rel) => format!(
            "\"$(dirname \"$0\")\"/{}",
            shell_quote(&rel.to_string_lossy().replace('\\', "/"))
        ),
        None => shell_quote(&script.to_string_lossy()),
    };

    format!(
        "#!/bin/sh\nexec {} {} \"$@\"\n",
        shell_quote(interpreter),
        script_arg
    )
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
