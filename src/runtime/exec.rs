//! External command execution and binary classification.

use anyhow::{Context, Result};
use std::path::Path;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn execute_impl(&self, command: &str) -> Result<()> {
        #[cfg(unix)]
        let expression = duct::cmd!("sh", "-c", command);
        #[cfg(windows)]
        let expression = duct::cmd!("cmd", "/C", command);

        expression
            .run()
            .with_context(|| format!("Failed to run command: {}", command))?;
        Ok(())
    }

    /// Uses goblin to detect ELF, Mach-O (including fat binaries) and PE images.
    /// Anything goblin cannot parse, including scripts, is not native.
    #[tracing::instrument(skip(self))]
    pub(crate) fn is_native_binary_impl(&self, path: &Path) -> bool {
        let buffer = match std::fs::read(path) {
            Ok(b) => b,
            Err(_) => return false,
        };

        matches!(
            goblin::Object::parse(&buffer),
            Ok(goblin::Object::Elf(_)) | Ok(goblin::Object::Mach(_)) | Ok(goblin::Object::PE(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{RealRuntime, Runtime};
    use tempfile::tempdir;

    #[test]
    fn test_script_is_not_native() {
        let runtime = RealRuntime;
        let dir = tempdir().unwrap();
        let script = dir.path().join("tool");
        runtime.write(&script, b"#!/bin/sh\necho hello\n").unwrap();

        assert!(!runtime.is_native_binary(&script));
    }

    #[test]
    fn test_missing_file_is_not_native() {
        let runtime = RealRuntime;
        assert!(!runtime.is_native_binary(std::path::Path::new("/nonexistent/tool")));
    }

    #[test]
    fn test_current_executable_is_native() {
        let runtime = RealRuntime;
        let exe = std::env::current_exe().unwrap();
        assert!(runtime.is_native_binary(&exe));
    }

    #[cfg(unix)]
    #[test]
    fn test_execute_reports_exit_status() {
        let runtime = RealRuntime;
        assert!(runtime.execute("true").is_ok());
        assert!(runtime.execute("exit 3").is_err());
    }
}
