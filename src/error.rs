//! Domain-specific error types for the provisioner.
//!
//! Internal modules mostly return [`anyhow::Result`] with context; the typed
//! errors below name the failures callers may want to match on. Command
//! handlers at the CLI boundary convert everything to [`anyhow::Error`] via `?`.
//!
//! # Error hierarchy
//!
//! ```text
//! SetupError
//! ├── Config(ConfigError)     profile resolution, TOML parsing
//! ├── Link(LinkError)         dotfile linking and backups
//! ├── Install(InstallError)   package managers, downloads, tools
//! ├── Platform(PlatformError) environment detection
//! └── TaskFailed              a task failed and the run stopped
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum SetupError {
    /// Configuration-related error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Dotfile linking error.
    #[error("link error: {0}")]
    Link(#[from] LinkError),

    /// Installer error.
    #[error("install error: {0}")]
    Install(#[from] InstallError),

    /// Platform or environment detection error.
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    /// A task failed; the remaining tasks were not run.
    #[error("task '{task}' failed, remaining tasks were not run")]
    TaskFailed {
        /// Name of the failing task.
        task: String,
    },
}

/// Errors from configuration loading and profile resolution.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The requested profile is not defined.
    #[error("unknown profile '{name}' (available: {available})")]
    UnknownProfile {
        /// Requested profile name.
        name: String,
        /// Comma-separated list of defined profiles.
        available: String,
    },

    /// A config file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A config file is not valid TOML or has an unexpected shape.
    #[error("invalid TOML in {path}: {message}")]
    Parse {
        /// Path to the file, or `<built-in>` for embedded defaults.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
}

/// Errors from the dotfile linker.
#[derive(Error, Debug)]
pub enum LinkError {
    /// A required package has no directory under the root.
    #[error("package directory not found: {}", .0.display())]
    PackageNotFound(PathBuf),

    /// A target is a non-empty real directory.
    #[error("{} is a non-empty directory", .target.display())]
    DirectoryConflict {
        /// Conflicting target path.
        target: PathBuf,
    },

    /// A target is still occupied by a regular file when linking.
    #[error("{} exists and is not a symlink", .target.display())]
    Occupied {
        /// Occupied target path.
        target: PathBuf,
    },

    /// Moving a pre-existing file aside failed.
    #[error("cannot back up {} to {}: {source}", .target.display(), .backup.display())]
    Backup {
        /// File being backed up.
        target: PathBuf,
        /// Intended backup path.
        backup: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Every numbered backup name for a target is taken.
    #[error("no free backup name left for {}", .0.display())]
    BackupsExhausted(PathBuf),

    /// Creating the symlink failed.
    #[error("cannot link {} -> {}: {source}", .target.display(), .source_path.display())]
    CreateLink {
        /// Symlink location.
        target: PathBuf,
        /// File the link should point at.
        source_path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors from installer steps.
#[derive(Error, Debug)]
pub enum InstallError {
    /// No supported system package manager was found.
    #[error("no supported package manager found")]
    NoPackageManager,

    /// The step needs root or sudo and neither is available.
    #[error("insufficient privilege: {0}")]
    NoPrivilege(String),

    /// A download did not succeed after all retries.
    #[error("download of {url} failed after {attempts} attempts: {reason}")]
    Download {
        /// Requested URL.
        url: String,
        /// Number of attempts made.
        attempts: u32,
        /// Last error message.
        reason: String,
    },

    /// A downloaded file does not match its published checksum.
    #[error("checksum mismatch for {}: expected {expected}, got {actual}", .path.display())]
    Checksum {
        /// Downloaded file.
        path: PathBuf,
        /// Published digest.
        expected: String,
        /// Computed digest.
        actual: String,
    },
}

/// Errors from platform and environment detection.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The home directory could not be determined.
    #[error("HOME is not set and no --home was given")]
    HomeNotSet,

    /// The root directory does not exist.
    #[error("root directory not found: {}", .0.display())]
    RootNotFound(PathBuf),
}
