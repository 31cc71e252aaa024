//! Task: install tmux plugins.
use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::resources::tool::tpm_dir;

/// Run tpm's `bin/install_plugins` so tmux starts with its plugins.
///
/// A failing plugin install is a warning.
#[derive(Debug)]
pub struct InstallTmuxPlugins;

impl Task for InstallTmuxPlugins {
    fn name(&self) -> &'static str {
        "Install tmux plugins"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.executor.which("tmux")
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let script = tpm_dir(ctx.home()).join("bin").join("install_plugins");
        if !script.is_file() {
            return Ok(TaskResult::Skipped("tpm is not installed".to_string()));
        }
        let script = script.display().to_string();

        if ctx.dry_run {
            ctx.log.dry_run(&format!("would run {script}"));
            return Ok(TaskResult::DryRun);
        }

        match ctx.executor.run(&script, &[]) {
            Ok(_) => {
                ctx.log.info("tmux plugins installed");
                Ok(TaskResult::Ok)
            }
            Err(e) => {
                ctx.log.warn(&format!("tmux plugin install failed: {e:#}"));
                Ok(TaskResult::Partial("tmux plugin install failed".to_string()))
            }
        }
    }
}
