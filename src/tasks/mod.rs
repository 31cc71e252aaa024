//! Named tasks that orchestrate resource changes, run strictly in order.
mod context;
pub mod directories;
pub mod link;
pub mod packages;
pub mod plugins;
mod processing;
pub mod shell;
pub mod tools;

pub use context::Context;
pub use processing::{ProcessOpts, TaskResult, TaskStats, process_resources};

use anyhow::Result;

use crate::logging::TaskStatus;

/// One step of a command, e.g. "Link packages".
pub trait Task: Send + Sync {
    /// Name shown in the stage header and the summary.
    fn name(&self) -> &str;

    /// `false` when the task has nothing to do for this profile or host; the
    /// task is then recorded as not applicable without running.
    fn should_run(&self, ctx: &Context) -> bool;

    /// # Errors
    ///
    /// An error fails the task, and the command stops after it.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// The tasks run by the install command, in execution order.
#[must_use]
pub fn all_install_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(packages::InstallSystemPackages),
        Box::new(tools::InstallTools),
        Box::new(directories::CreateDirectories),
        Box::new(link::LinkPackages),
        Box::new(shell::ConfigureShell),
        Box::new(plugins::InstallTmuxPlugins),
    ]
}

/// The tasks run by the uninstall command, in execution order.
#[must_use]
pub fn all_uninstall_tasks() -> Vec<Box<dyn Task>> {
    vec![Box::new(link::UnlinkPackages)]
}

/// Run `task` if it applies, record its outcome in the logger and return it.
pub fn execute(task: &dyn Task, ctx: &Context) -> TaskStatus {
    let name = task.name();
    if !task.should_run(ctx) {
        ctx.log.debug(&format!("{name}: not applicable"));
        ctx.log.record_task(name, TaskStatus::NotApplicable, None);
        return TaskStatus::NotApplicable;
    }

    ctx.log.stage(name);
    let (status, message) = match task.run(ctx) {
        Ok(TaskResult::Ok) => (TaskStatus::Ok, None),
        Ok(TaskResult::DryRun) => (TaskStatus::DryRun, None),
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            (TaskStatus::Skipped, Some(reason))
        }
        Ok(TaskResult::Partial(reason)) => (TaskStatus::Partial, Some(reason)),
        Err(e) => {
            let chain = format!("{e:#}");
            ctx.log.error(&format!("{name}: {chain}"));
            (TaskStatus::Failed, Some(chain))
        }
    };
    ctx.log.record_task(name, status, message.as_deref());
    status
}


#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use test_helpers::{empty_config, make_static_context};

    /// A mock task for testing `execute()`.
    struct MockTask {
        name: &'static str,
        should_run: bool,
        result: Result<TaskResult, String>,
    }

    impl Task for MockTask {
        fn name(&self) -> &str {
            self.name
        }
        fn should_run(&self, _ctx: &Context) -> bool {
            self.should_run
        }
        fn run(&self, _ctx: &Context) -> Result<TaskResult> {
            self.result.clone().map_err(|s| anyhow::anyhow!("{s}"))
        }
    }

    fn run_mock(should_run: bool, result: Result<TaskResult, String>) -> (TaskStatus, usize) {
        let (ctx, log) = make_static_context(empty_config(PathBuf::from("/tmp")));
        let task = MockTask {
            name: "mock-task",
            should_run,
            result,
        };
        let status = execute(&task, &ctx);
        let failed = log
            .task_entries()
            .iter()
            .filter(|e| e.status == TaskStatus::Failed)
            .count();
        (status, failed)
    }

    #[test]
    fn execute_skips_non_applicable_task() {
        assert_eq!(
            run_mock(false, Ok(TaskResult::Ok)),
            (TaskStatus::NotApplicable, 0)
        );
    }

    #[test]
    fn execute_records_ok_task() {
        assert_eq!(run_mock(true, Ok(TaskResult::Ok)), (TaskStatus::Ok, 0));
    }

    #[test]
    fn execute_records_failed_task() {
        assert_eq!(
            run_mock(true, Err("kaboom".to_string())),
            (TaskStatus::Failed, 1)
        );
    }

    #[test]
    fn execute_records_skipped_task() {
        assert_eq!(
            run_mock(true, Ok(TaskResult::Skipped("not needed".to_string()))),
            (TaskStatus::Skipped, 0)
        );
    }

    #[test]
    fn execute_records_dry_run_task() {
        assert_eq!(
            run_mock(true, Ok(TaskResult::DryRun)),
            (TaskStatus::DryRun, 0)
        );
    }

    #[test]
    fn execute_partial_is_not_a_failure() {
        assert_eq!(
            run_mock(true, Ok(TaskResult::Partial("kitty failed".to_string()))),
            (TaskStatus::Partial, 0)
        );
    }

    #[test]
    fn install_tasks_in_order() {
        let names: Vec<String> = all_install_tasks()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "Install system packages",
                "Install tools",
                "Create directories",
                "Link packages",
                "Configure default shell",
                "Install tmux plugins",
            ]
        );
    }
}
