//! Deciding what to do with one resource and doing it.

use anyhow::Result;

use super::ProcessOpts;
use crate::resources::{Resource, ResourceChange, ResourceState};
use crate::tasks::Context;

/// Where one resource ends up in the task's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Tally {
    Changed,
    AlreadyOk,
    Skipped,
    Failed,
}

/// Bring `resource` from `state` to its desired state, or report what would
/// change on a dry run.
pub(super) fn settle<R: Resource>(
    ctx: &Context,
    resource: &R,
    state: ResourceState,
    opts: &ProcessOpts,
) -> Result<Tally> {
    let desc = resource.description();
    match state {
        ResourceState::Correct => {
            ctx.log.debug(&format!("ok: {desc}"));
            Ok(Tally::AlreadyOk)
        }
        ResourceState::Invalid { reason } => {
            ctx.log.warn(&format!("skipping {desc}: {reason}"));
            Ok(Tally::Skipped)
        }
        ResourceState::Incorrect { current } if ctx.dry_run => {
            ctx.log
                .dry_run(&format!("would {} {desc} (currently {current})", opts.verb));
            Ok(Tally::Changed)
        }
        ResourceState::Missing if ctx.dry_run => {
            ctx.log.dry_run(&format!("would {}: {desc}", opts.verb));
            Ok(Tally::Changed)
        }
        ResourceState::Missing | ResourceState::Incorrect { .. } => apply(ctx, resource, opts),
    }
}

/// Apply one change. Outside strict mode a failure becomes a warning.
fn apply<R: Resource>(ctx: &Context, resource: &R, opts: &ProcessOpts) -> Result<Tally> {
    let desc = resource.description();
    let failure = match resource.apply() {
        Ok(ResourceChange::Applied) => {
            ctx.log.info(&format!("{}: {desc}", opts.verb));
            return Ok(Tally::Changed);
        }
        Ok(ResourceChange::AlreadyCorrect) => return Ok(Tally::AlreadyOk),
        Ok(ResourceChange::Skipped { reason }) => anyhow::anyhow!("{reason}"),
        Err(e) => e,
    };
    let failure = failure.context(format!("failed to {} {desc}", opts.verb));
    if opts.bail_on_error {
        return Err(failure);
    }
    ctx.log.warn(&format!("{failure:#}"));
    Ok(Tally::Failed)
}
