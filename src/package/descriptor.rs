//! Hook descriptors with variables substituted at load time.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::runtime::Runtime;

#[derive(Deserialize, Debug, Default)]
struct DescriptorFile {
    #[serde(default)]
    hooks: Option<BTreeMap<String, String>>,
    #[serde(default)]
    variables: BTreeMap<String, String>,
}

/// Hook commands of one instance, keyed by hook name (`post_install`, ...).
///
/// Built once with every `$(VAR)` reference already expanded; never mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookDescriptor {
    hooks: Option<BTreeMap<String, String>>,
}

impl HookDescriptor {
    pub const FILE_NAME: &'static str = "descriptor.json";

    /// Expand `variables` into every hook command.
    pub fn new(
        hooks: Option<BTreeMap<String, String>>,
        variables: &BTreeMap<String, String>,
    ) -> Self {
        let hooks = hooks.map(|table| {
            table
                .into_iter()
                .map(|(name, command)| (name, substitute(&command, variables)))
                .collect()
        });
        Self { hooks }
    }

    /// Load the descriptor at `path`; `None` when there is no such file.
    ///
    /// Variables declared in the file take precedence over `builtins`.
    #[tracing::instrument(skip(runtime, builtins))]
    pub fn load<R: Runtime>(
        runtime: &R,
        path: &Path,
        builtins: &BTreeMap<String, String>,
    ) -> Result<Option<Self>> {
        if !runtime.exists(path) {
            return Ok(None);
        }
        let content = runtime.read_to_string(path)?;
        let file: DescriptorFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse descriptor {:?}", path))?;

        let mut variables = builtins.clone();
        variables.extend(file.variables);
        Ok(Some(Self::new(file.hooks, &variables)))
    }

    pub fn hooks(&self) -> Option<&BTreeMap<String, String>> {
        self.hooks.as_ref()
    }

    pub fn command(&self, hook: &str) -> Option<&str> {
        self.hooks.as_ref()?.get(hook).map(String::as_str)
    }
}

/// Replace each `$(NAME)` with its value; unknown names are kept verbatim.
pub fn substitute(text: &str, variables: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("$(") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find(')') {
            Some(end) => {
                let name = &after[..end];
                match variables.get(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 1]),
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitute() {
        let variables = vars(&[("PREFIX", "/tree/rocks/pkg/1.0-1"), ("BINDIR", "/tree/bin")]);

        assert_eq!(
            substitute("cp $(PREFIX)/x $(BINDIR)", &variables),
            "cp /tree/rocks/pkg/1.0-1/x /tree/bin"
        );
        assert_eq!(substitute("echo $(UNKNOWN)", &variables), "echo $(UNKNOWN)");
        assert_eq!(substitute("echo $(PREFIX", &variables), "echo $(PREFIX");
        assert_eq!(substitute("no variables", &variables), "no variables");
    }

    #[test]
    fn test_substitution_happens_once() {
        // A value that itself looks like a reference is not expanded again
        let variables = vars(&[("A", "$(B)"), ("B", "b")]);
        let descriptor = HookDescriptor::new(
            Some(BTreeMap::from([("post_install".to_string(), "run $(A)".to_string())])),
            &variables,
        );
        assert_eq!(descriptor.command("post_install"), Some("run $(B)"));
    }

    #[test]
    fn test_load_merges_variables() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| true);
        runtime.expect_read_to_string().returning(|_| {
            Ok(r#"{
                "hooks": {"post_install": "$(PREFIX)/setup --mode $(MODE)"},
                "variables": {"MODE": "fast"}
            }"#
            .into())
        });

        let builtins = vars(&[("PREFIX", "/p"), ("MODE", "slow")]);
        let descriptor = HookDescriptor::load(&runtime, Path::new("/p/descriptor.json"), &builtins)
            .unwrap()
            .unwrap();
        assert_eq!(descriptor.command("post_install"), Some("/p/setup --mode fast"));
        assert_eq!(descriptor.command("pre_remove"), None);
    }

    #[test]
    fn test_load_without_hooks() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| true);
        runtime
            .expect_read_to_string()
            .returning(|_| Ok("{}".into()));

        let descriptor =
            HookDescriptor::load(&runtime, Path::new("/d.json"), &BTreeMap::new())
                .unwrap()
                .unwrap();
        assert!(descriptor.hooks().is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| false);

        let descriptor =
            HookDescriptor::load(&runtime, Path::new("/d.json"), &BTreeMap::new()).unwrap();
        assert!(descriptor.is_none());
    }
}
