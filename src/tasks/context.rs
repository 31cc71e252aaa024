//! Shared execution context for tasks.
use std::path::Path;
use std::sync::Arc;

use crate::config::{Config, Environment};
use crate::exec::Executor;
use crate::logging::Log;
use crate::net::Downloader;
use crate::platform::Platform;
use crate::resources::tool::Installer;

/// Everything a task may read or call: configuration, host facts, the
/// logger, and the process and network seams.
pub struct Context {
    /// Configuration loaded for the resolved profile.
    pub config: Arc<Config>,
    /// Detected platform information.
    pub platform: Arc<Platform>,
    /// Environment captured at startup (home, constrained, CI, shell).
    pub env: Environment,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Network access (for testing or real downloads).
    pub downloader: Arc<dyn Downloader>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("root", &self.config.root)
            .field("profile", &self.config.profile.name)
            .field("platform", &self.platform)
            .field("env", &self.env)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Creates a new context for task execution.
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        platform: Arc<Platform>,
        env: Environment,
        log: Arc<dyn Log>,
        dry_run: bool,
        executor: Arc<dyn Executor>,
        downloader: Arc<dyn Downloader>,
    ) -> Self {
        Self {
            config,
            platform,
            env,
            log,
            dry_run,
            executor,
            downloader,
        }
    }

    /// Root directory holding the packages.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Home directory receiving the links.
    #[must_use]
    pub fn home(&self) -> &Path {
        &self.env.home
    }

    /// Collaborators for tool install strategies.
    #[must_use]
    pub fn installer(&self) -> Installer<'_> {
        Installer {
            executor: &*self.executor,
            downloader: &*self.downloader,
            home: self.home(),
        }
    }
}
