//! Tasks: link and unlink dotfile packages.
use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::linker::{LinkReport, Linker};

fn finish(ctx: &Context, report: &LinkReport, summary: String) -> TaskResult {
    ctx.log.info(&summary);
    let failed: Vec<&str> = report.failures().map(|p| p.name.as_str()).collect();
    if !failed.is_empty() {
        return TaskResult::Partial(format!("failed packages: {}", failed.join(", ")));
    }
    if ctx.dry_run {
        TaskResult::DryRun
    } else {
        TaskResult::Ok
    }
}

/// Symlink every file of the selected packages into the home directory.
///
/// A package that fails is reported and the others are still linked.
#[derive(Debug)]
pub struct LinkPackages;

impl Task for LinkPackages {
    fn name(&self) -> &'static str {
        "Link packages"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.packages.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let report = Linker::new(ctx.root(), ctx.home(), &*ctx.log)
            .dry_run(ctx.dry_run)
            .link(&ctx.config.packages)?;
        let totals = report.totals();
        let verb = if ctx.dry_run { "would link" } else { "linked" };
        let summary = format!(
            "{} {verb}, {} already ok, {} backed up",
            totals.linked, totals.unchanged, totals.backed_up
        );
        Ok(finish(ctx, &report, summary))
    }
}

/// Remove the links created by [`LinkPackages`] and restore backups.
#[derive(Debug)]
pub struct UnlinkPackages;

impl Task for UnlinkPackages {
    fn name(&self) -> &'static str {
        "Unlink packages"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.packages.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let report = Linker::new(ctx.root(), ctx.home(), &*ctx.log)
            .dry_run(ctx.dry_run)
            .unlink(&ctx.config.packages)?;
        let totals = report.totals();
        let verb = if ctx.dry_run { "would remove" } else { "removed" };
        let summary = format!("{} {verb}, {} restored", totals.removed, totals.restored);
        Ok(finish(ctx, &report, summary))
    }
}
