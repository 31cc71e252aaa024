//! System packages declared in `conf/system-packages.toml`.
use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

use super::toml_loader::{filter_by_categories, load_section_items};

#[derive(Debug, Deserialize)]
struct Section {
    #[serde(default)]
    packages: Vec<String>,
}

/// Built-in system package list used when the config file is absent.
pub const DEFAULT_SYSTEM_PACKAGES: &str = r#"
[base]
packages = ["git", "curl", "zsh", "tmux", "unzip"]

[linux]
packages = ["fontconfig"]

[macos]
packages = ["coreutils"]
"#;

/// Load system package names for the active categories, without duplicates.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load(path: &Path, active_categories: &[String]) -> Result<Vec<String>> {
    let sections = load_section_items(path, DEFAULT_SYSTEM_PACKAGES, |s: Section| s.packages)?;
    let mut names: Vec<String> = Vec::new();
    for name in filter_by_categories(sections, active_categories) {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    Ok(names)
}
