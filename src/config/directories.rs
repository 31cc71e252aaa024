//! Home-relative directories declared in `conf/directories.toml`.
use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::toml_loader::{filter_by_categories, load_section_items};

#[derive(Debug, Deserialize)]
struct Section {
    #[serde(default)]
    directories: Vec<PathBuf>,
}

/// Built-in directory list used when the config file is absent.
pub const DEFAULT_DIRECTORIES: &str = r#"
[base]
directories = [".cache/zsh", ".config", ".local/bin", ".local/state"]

[terminal]
directories = [".tmux/plugins"]
"#;

/// Load directories (relative to home) for the active categories.
///
/// Absolute entries are rejected so that the list always stays under home.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or an entry is absolute.
pub fn load(path: &Path, active_categories: &[String]) -> Result<Vec<PathBuf>> {
    let sections = load_section_items(path, DEFAULT_DIRECTORIES, |s: Section| s.directories)?;
    let mut dirs: Vec<PathBuf> = Vec::new();
    for dir in filter_by_categories(sections, active_categories) {
        if dir.is_absolute() {
            anyhow::bail!(
                "{}: directory '{}' must be relative to home",
                path.display(),
                dir.display()
            );
        }
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    Ok(dirs)
}
