//! Configuration: environment, profiles and the `conf/*.toml` lists.
pub mod category_matcher;
pub mod directories;
pub mod environment;
pub mod packages;
pub mod profiles;
pub mod system_packages;
pub mod toml_loader;

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

pub use environment::Environment;
pub use packages::Package;
pub use profiles::Profile;

/// All loaded configuration for a resolved profile.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory holding the package directories and `conf/`.
    pub root: PathBuf,
    /// Resolved profile.
    pub profile: Profile,
    /// Dotfile packages to link, in order.
    pub packages: Vec<Package>,
    /// System packages to install.
    pub system_packages: Vec<String>,
    /// Directories to create, relative to home.
    pub directories: Vec<PathBuf>,
}

impl Config {
    /// Load all configuration for `profile` from `<root>/conf`.
    ///
    /// Every file is optional; absent files fall back to built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be read or parsed.
    pub fn load(root: &Path, profile: Profile) -> Result<Self> {
        let conf = root.join("conf");
        let active = &profile.active_categories;

        let packages =
            packages::load(&conf.join("packages.toml"), active).context("loading packages.toml")?;
        let system_packages = system_packages::load(&conf.join("system-packages.toml"), active)
            .context("loading system-packages.toml")?;
        let directories = directories::load(&conf.join("directories.toml"), active)
            .context("loading directories.toml")?;

        Ok(Self {
            root: root.to_path_buf(),
            profile,
            packages,
            system_packages,
            directories,
        })
    }
}
