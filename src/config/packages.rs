//! Dotfile packages declared in `conf/packages.toml`.
use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::toml_loader::{filter_by_categories, load_section_items};

/// A directory of configuration files mirrored into the home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Directory name under the root.
    pub name: String,
    /// Skip silently when the directory is absent.
    pub optional: bool,
}

impl Package {
    /// A package that must be present.
    #[must_use]
    pub fn required(name: &str) -> Self {
        Self {
            name: name.to_string(),
            optional: false,
        }
    }

    /// A package that is linked only when its directory exists.
    #[must_use]
    pub fn optional(name: &str) -> Self {
        Self {
            name: name.to_string(),
            optional: true,
        }
    }

    /// Package directory under `root`.
    #[must_use]
    pub fn dir(&self, root: &Path) -> PathBuf {
        root.join(&self.name)
    }
}

/// A package entry: a bare name or a table with options.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PackageEntry {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        optional: bool,
    },
}

impl From<PackageEntry> for Package {
    fn from(entry: PackageEntry) -> Self {
        match entry {
            PackageEntry::Name(name) => Self {
                name,
                optional: false,
            },
            PackageEntry::Detailed { name, optional } => Self { name, optional },
        }
    }
}

#[derive(Debug, Deserialize)]
struct PackageSection {
    #[serde(default)]
    packages: Vec<PackageEntry>,
}

/// Built-in package list used when `conf/packages.toml` is absent.
pub const DEFAULT_PACKAGES: &str = r#"
[base]
packages = ["zsh", "tmux", "starship", "nvim"]

[terminal]
packages = [
    { name = "alacritty", optional = true },
    { name = "kitty", optional = true },
    { name = "wezterm", optional = true },
]
"#;

/// Load packages for the active categories, in declaration order.
///
/// A package listed in several matching sections is kept once, at its first
/// position.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load(path: &Path, active_categories: &[String]) -> Result<Vec<Package>> {
    let sections = load_section_items(path, DEFAULT_PACKAGES, |s: PackageSection| s.packages)?;
    let mut packages: Vec<Package> = Vec::new();
    for package in filter_by_categories(sections, active_categories)
        .into_iter()
        .map(Package::from)
    {
        if !packages.iter().any(|p| p.name == package.name) {
            packages.push(package);
        }
    }
    Ok(packages)
}
