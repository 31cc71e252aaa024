//! Task: make zsh the login shell.
use anyhow::Result;

use super::{Context, ProcessOpts, Task, TaskResult, process_resources};
use crate::resources::shell::DefaultShellResource;

/// Configure the default login shell to zsh.
#[derive(Debug)]
pub struct ConfigureShell;

impl Task for ConfigureShell {
    fn name(&self) -> &'static str {
        "Configure default shell"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        // chsh prompts for a password, which nobody answers in these contexts
        !ctx.env.constrained && !ctx.env.ci && ctx.executor.which("zsh")
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let resource = DefaultShellResource::new(
            "zsh".to_string(),
            ctx.env.user.clone(),
            ctx.env.shell.clone(),
            &*ctx.executor,
        );
        process_resources(
            ctx,
            std::iter::once(resource),
            &ProcessOpts::apply_all("configure").no_bail(),
        )
    }
}
