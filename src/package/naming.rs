//! Naming rules shared by the deployer and the undeployer.

use std::path::{Path, PathBuf};

/// Extensions stripped when turning a module path into a dotted identifier.
const MODULE_EXTENSIONS: &[&str] = &[".lua", ".so", ".dll", ".dylib"];

/// Escapes `_`, `-` and `.` as `__`, `_h` and `_d`, so the result has no
/// `-` and no `_v` token.
fn escape_tag_part(part: &str, out: &mut String) {
    for c in part.chars() {
        match c {
            '_' => out.push_str("__"),
            '-' => out.push_str("_h"),
            '.' => out.push_str("_d"),
            c => out.push(c),
        }
    }
}

/// `<name>_v<version>`, each part escaped. Distinct instances always get
/// distinct tags, and the tag never contains the `-` that ends it.
fn instance_tag(name: &str, version: &str) -> String {
    let mut tag = String::with_capacity(name.len() + version.len() + 4);
    escape_tag_part(name, &mut tag);
    tag.push_str("_v");
    escape_tag_part(version, &mut tag);
    tag
}

/// Sibling of `target` that embeds the owning instance's name and version.
///
/// `/tree/share/lua/sub/b.lua` for `("pkg", "1.0-1")` becomes
/// `/tree/share/lua/sub/pkg_v1_d0_h1-b.lua`.
pub fn versioned_name(target: &Path, name: &str, version: &str) -> PathBuf {
    let file_name = target
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!("{}-{}", instance_tag(name, version), file_name))
}

/// Dotted module identifier for a path relative to a module root.
///
/// `sub/b.lua` -> `sub.b`, `socket/core.so` -> `socket.core`.
pub fn module_id(relative_path: &str) -> String {
    let stem = MODULE_EXTENSIONS
        .iter()
        .find_map(|ext| relative_path.strip_suffix(ext))
        .unwrap_or(relative_path);
    stem.replace(['/', '\\'], ".")
}
