//! Login shell resource.
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// A resource for configuring the default login shell.
#[derive(Debug)]
pub struct DefaultShellResource<'a> {
    /// Target shell name (e.g., "zsh").
    target_shell: String,
    /// Account whose passwd entry holds the login shell.
    user: Option<String>,
    /// `$SHELL` at startup, used when the passwd entry cannot be read.
    fallback: Option<PathBuf>,
    /// Executor for running system commands.
    executor: &'a dyn Executor,
}

impl<'a> DefaultShellResource<'a> {
    /// Create a new default shell resource.
    #[must_use]
    pub const fn new(
        target_shell: String,
        user: Option<String>,
        fallback: Option<PathBuf>,
        executor: &'a dyn Executor,
    ) -> Self {
        Self {
            target_shell,
            user,
            fallback,
            executor,
        }
    }

    /// The login shell from `getent passwd <user>`, else the fallback.
    fn login_shell(&self) -> Option<PathBuf> {
        self.user
            .as_deref()
            .and_then(|user| self.executor.run_unchecked("getent", &["passwd", user]).ok())
            .filter(|result| result.success)
            .and_then(|result| passwd_shell(&result.stdout))
            .or_else(|| self.fallback.clone())
    }

    fn shell_path(&self) -> Result<String> {
        let result = self
            .executor
            .run("sh", &["-c", &format!("command -v {}", self.target_shell)])
            .with_context(|| format!("locating {}", self.target_shell))?;
        let path = result.stdout.trim();
        anyhow::ensure!(!path.is_empty(), "{} not found on PATH", self.target_shell);
        Ok(path.to_string())
    }
}

impl Applicable for DefaultShellResource<'_> {
    fn description(&self) -> String {
        format!("default shell → {}", self.target_shell)
    }

    fn apply(&self) -> Result<ResourceChange> {
        let shell_path = self.shell_path()?;
        self.executor.run("chsh", &["-s", &shell_path])?;
        Ok(ResourceChange::Applied)
    }
}

/// Shell field (the seventh) of a passwd line.
fn passwd_shell(entry: &str) -> Option<PathBuf> {
    entry
        .lines()
        .next()?
        .split(':')
        .nth(6)
        .map(str::trim)
        .filter(|shell| !shell.is_empty())
        .map(PathBuf::from)
}

impl Resource for DefaultShellResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        match &self.login_shell() {
            None => Ok(ResourceState::Missing),
            Some(path) if path.file_name().is_some_and(|n| *n == *self.target_shell) => {
                Ok(ResourceState::Correct)
            }
            Some(path) => Ok(ResourceState::Incorrect {
                current: path.display().to_string(),
            }),
        }
    }
}
