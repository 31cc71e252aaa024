//! `envsetup install`: provision everything.
use anyhow::Result;
use std::sync::Arc;

use super::CommandRunner;
use crate::cli::{GlobalOpts, InstallOpts};
use crate::logging::Logger;
use crate::tasks::{self, Task};

/// Run the install command.
///
/// # Errors
///
/// Returns an error if profile resolution, configuration loading, or task execution fails.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Arc<Logger>) -> Result<()> {
    log.info(&format!("envsetup {}", super::version::version()));
    let runner = CommandRunner::new(global, log)?;
    run_with(&runner, opts)
}

/// Run the install tasks selected by `opts` with an already configured runner.
///
/// # Errors
///
/// Returns an error if a task fails.
pub fn run_with(runner: &CommandRunner, opts: &InstallOpts) -> Result<()> {
    let all_tasks = tasks::all_install_tasks();
    runner.run(filter_tasks(&all_tasks, opts))
}

/// Apply `--only` and `--skip`: case-insensitive substring matches on the
/// task name. `--only` wins when both are given.
#[must_use]
pub fn filter_tasks<'a>(all_tasks: &'a [Box<dyn Task>], opts: &InstallOpts) -> Vec<&'a dyn Task> {
    let matches = |name: &str, patterns: &[String]| {
        patterns
            .iter()
            .any(|p| name.contains(&p.to_lowercase()))
    };
    all_tasks
        .iter()
        .filter(|t| {
            let name = t.name().to_lowercase();
            if !opts.only.is_empty() {
                return matches(&name, &opts.only);
            }
            !matches(&name, &opts.skip)
        })
        .map(AsRef::as_ref)
        .collect()
}
