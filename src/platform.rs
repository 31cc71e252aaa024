//! Operating system and package-manager detection.
use std::fmt;

use crate::exec::Executor;
use crate::resources::package::PackageManager;

/// Detected operating system platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Any Linux distribution.
    Linux,
    /// macOS.
    MacOs,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::MacOs => write!(f, "macos"),
        }
    }
}

/// Platform information for the current system.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Operating system.
    pub os: Os,
    /// System package manager found on PATH, if any.
    pub package_manager: Option<PackageManager>,
}

impl Platform {
    /// Detect the current platform, probing PATH for a package manager.
    pub fn detect(executor: &dyn Executor) -> Self {
        let os = Self::detect_os();
        Self {
            os,
            package_manager: Self::detect_package_manager(os, executor),
        }
    }

    /// Create a platform with explicit values.
    #[must_use]
    pub const fn new(os: Os, package_manager: Option<PackageManager>) -> Self {
        Self {
            os,
            package_manager,
        }
    }

    /// Whether this is a macOS system.
    #[must_use]
    pub fn is_macos(&self) -> bool {
        self.os == Os::MacOs
    }

    /// Check whether a category tag is incompatible with this platform.
    #[must_use]
    pub fn excludes_category(&self, category: &str) -> bool {
        match category {
            "linux" => self.os != Os::Linux,
            "macos" => self.os != Os::MacOs,
            _ => false,
        }
    }

    const fn detect_os() -> Os {
        if cfg!(target_os = "macos") {
            Os::MacOs
        } else {
            // Other Unix-like systems are handled like Linux
            Os::Linux
        }
    }

    fn detect_package_manager(os: Os, executor: &dyn Executor) -> Option<PackageManager> {
        let candidates: &[PackageManager] = match os {
            Os::MacOs => &[PackageManager::Brew],
            Os::Linux => &[
                PackageManager::Apt,
                PackageManager::Pacman,
                PackageManager::Dnf,
                PackageManager::Brew,
            ],
        };
        candidates
            .iter()
            .copied()
            .find(|pm| executor.which(pm.binary()))
    }
}
