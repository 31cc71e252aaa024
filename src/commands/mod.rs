//! Top-level subcommands and the shared task runner.
pub mod completions;
pub mod install;
pub mod status;
pub mod uninstall;
pub mod version;

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::GlobalOpts;
use crate::config::{Config, Environment, profiles};
use crate::error::{PlatformError, SetupError};
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger, TaskStatus};
use crate::net::{Downloader, UreqDownloader};
use crate::platform::Platform;
use crate::tasks::{self, Context, Task};

/// Everything read from the machine before any task runs.
#[derive(Debug)]
pub struct Host {
    /// Directory holding the packages and `conf/`, before canonicalisation.
    pub root: PathBuf,
    /// Environment captured at startup.
    pub env: Environment,
    /// Detected platform.
    pub platform: Platform,
    /// Subprocess seam.
    pub executor: Arc<dyn Executor>,
    /// Network seam.
    pub downloader: Arc<dyn Downloader>,
}

impl Host {
    /// Inspect the running system: environment variables, OS and package manager.
    ///
    /// `--home` replaces `$HOME`, so an unset `HOME` is only an error when no
    /// home was given on the command line.
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory is known or the current directory
    /// cannot be read.
    pub fn detect(global: &GlobalOpts) -> Result<Self> {
        let env = Environment::from_vars(|key| match (key, &global.home) {
            ("HOME", Some(home)) => Some(home.to_string_lossy().into_owned()),
            _ => std::env::var(key).ok(),
        })?;
        let root = match &global.root {
            Some(root) => root.clone(),
            None => std::env::var_os("ENVSETUP_ROOT").map_or_else(std::env::current_dir, |r| {
                Ok(PathBuf::from(r))
            })?,
        };
        let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);
        let platform = Platform::detect(&*executor);
        Ok(Self {
            root,
            env,
            platform,
            executor,
            downloader: Arc::new(UreqDownloader::default()),
        })
    }
}

/// Canonicalise the root directory.
///
/// # Errors
///
/// Returns [`PlatformError::RootNotFound`] if `root` is not an existing directory.
pub fn resolve_root(root: &Path) -> Result<PathBuf, PlatformError> {
    match dunce::canonicalize(root) {
        Ok(path) if path.is_dir() => Ok(path),
        _ => Err(PlatformError::RootNotFound(root.to_path_buf())),
    }
}

/// Resolves the profile, loads configuration and runs tasks against the
/// resulting [`Context`].
#[derive(Debug)]
pub struct CommandRunner {
    ctx: Context,
    log: Arc<Logger>,
}

impl CommandRunner {
    /// Detect the host and set up a runner for it.
    ///
    /// # Errors
    ///
    /// Returns an error if detection, profile resolution or configuration
    /// loading fails.
    pub fn new(global: &GlobalOpts, log: &Arc<Logger>) -> Result<Self> {
        Self::with_host(global, Host::detect(global)?, log)
    }

    /// Set up a runner for an explicitly described host.
    ///
    /// # Errors
    ///
    /// Returns an error if the root does not exist, the profile is unknown, or
    /// any configuration file fails to parse.
    pub fn with_host(global: &GlobalOpts, host: Host, log: &Arc<Logger>) -> Result<Self> {
        let root = resolve_root(&host.root)?;
        let env = host.env.constrained(global.constrained);
        log.debug(&format!("root: {}", root.display()));
        log.debug(&format!("home: {}", env.home.display()));
        log.debug(&format!("platform: {}", host.platform.os));
        if env.constrained {
            log.info("constrained context: terminal packages and shell change are skipped");
        }

        log.stage("Resolving profile");
        let name = global
            .profile
            .as_deref()
            .unwrap_or_else(|| env.default_profile());
        let profile = profiles::resolve(name, &root.join("conf"), &host.platform)
            .context("resolving profile")?;
        log.info(&format!("profile: {}", profile.name));
        log.debug(&format!(
            "active categories: {}",
            profile.active_categories.join(", ")
        ));

        log.stage("Loading configuration");
        let config = Config::load(&root, profile)?;
        log.info(&format!(
            "loaded {} packages, {} system packages, {} directories",
            config.packages.len(),
            config.system_packages.len(),
            config.directories.len()
        ));

        let ctx = Context::new(
            Arc::new(config),
            Arc::new(host.platform),
            env,
            Arc::clone(log) as Arc<dyn Log>,
            global.dry_run,
            host.executor,
            host.downloader,
        );
        Ok(Self {
            ctx,
            log: Arc::clone(log),
        })
    }

    /// The execution context built from the host and configuration.
    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.ctx
    }

    /// Run tasks in order, stopping at the first failure, then print the summary.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::TaskFailed`] naming the task that failed.
    pub fn run<'a>(&self, tasks: impl IntoIterator<Item = &'a dyn Task>) -> Result<()> {
        for task in tasks {
            if tasks::execute(task, &self.ctx) == TaskStatus::Failed {
                break;
            }
        }

        self.log.print_summary();

        match self.log.first_failure() {
            Some(entry) => Err(SetupError::TaskFailed { task: entry.name }.into()),
            None => Ok(()),
        }
    }
}
