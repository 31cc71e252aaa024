//! Task: create configured directories.
use anyhow::Result;

use super::{Context, ProcessOpts, Task, TaskResult, process_resources};
use crate::resources::directory::DirectoryResource;

/// Create the cache and config directories the linked tools expect.
#[derive(Debug)]
pub struct CreateDirectories;

impl Task for CreateDirectories {
    fn name(&self) -> &'static str {
        "Create directories"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.directories.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let resources = ctx
            .config
            .directories
            .iter()
            .map(|dir| DirectoryResource::new(ctx.home().join(dir)));
        process_resources(ctx, resources, &ProcessOpts::apply_all("create"))
    }
}
