//! `envsetup uninstall`: remove links into the packages and restore backups.
use anyhow::Result;
use std::sync::Arc;

use super::CommandRunner;
use crate::cli::GlobalOpts;
use crate::logging::Logger;
use crate::tasks;

/// # Errors
///
/// Returns an error if the runner cannot be set up or unlinking fails.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    run_with(&CommandRunner::new(global, log)?)
}

/// Unlink every configured package through `runner`.
///
/// Installed system packages, tools, directories and the login shell are
/// left as they are.
///
/// # Errors
///
/// Returns [`SetupError::TaskFailed`](crate::error::SetupError::TaskFailed)
/// if unlinking fails.
pub fn run_with(runner: &CommandRunner) -> Result<()> {
    let tasks = tasks::all_uninstall_tasks();
    runner.run(tasks.iter().map(AsRef::as_ref))
}
