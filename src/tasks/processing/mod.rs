//! Check-then-apply loop over resources, and the counters tasks report.

mod apply;

use anyhow::Result;

use self::apply::Tally;
use super::Context;
use crate::resources::Resource;

/// What a task reports when it returns normally.
///
/// ```
/// use envsetup::tasks::TaskResult;
///
/// let ok = TaskResult::Ok;
/// let skipped = TaskResult::Skipped("no package manager".into());
/// let partial = TaskResult::Partial("failed packages: kitty".into());
///
/// assert!(matches!(ok, TaskResult::Ok));
/// assert!(matches!(skipped, TaskResult::Skipped(_)));
/// assert!(matches!(partial, TaskResult::Partial(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Task completed successfully.
    Ok,
    /// Task was skipped (not applicable, or a precondition is missing).
    Skipped(String),
    /// Task ran in dry-run mode.
    DryRun,
    /// Task finished but some items failed; the failures were warnings.
    Partial(String),
}

/// Per-item counters for tasks that handle many items.
///
/// ```
/// use envsetup::tasks::TaskStats;
///
/// let stats = TaskStats { changed: 1, already_ok: 2, skipped: 0, failed: 1 };
/// assert_eq!(stats.summary(false), "1 changed, 2 already ok, 1 failed");
/// assert_eq!(stats.summary(true), "1 would change, 2 already ok, 1 failed");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    /// Items changed (or that would change on a dry run).
    pub changed: u32,
    /// Items already as desired.
    pub already_ok: u32,
    /// Items that could not be handled and were left alone.
    pub skipped: u32,
    /// Items whose change failed and was reported as a warning.
    pub failed: u32,
}

impl TaskStats {
    /// All counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn count(&mut self, tally: Tally) {
        let slot = match tally {
            Tally::Changed => &mut self.changed,
            Tally::AlreadyOk => &mut self.already_ok,
            Tally::Skipped => &mut self.skipped,
            Tally::Failed => &mut self.failed,
        };
        *slot += 1;
    }

    /// One-line summary; zero skipped and failed counts are left out.
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would change" } else { "changed" };
        let mut parts = vec![
            format!("{} {verb}", self.changed),
            format!("{} already ok", self.already_ok),
        ];
        for (count, label) in [(self.skipped, "skipped"), (self.failed, "failed")] {
            if count > 0 {
                parts.push(format!("{count} {label}"));
            }
        }
        parts.join(", ")
    }

    /// Log the summary and turn the counters into a [`TaskResult`].
    ///
    /// A dry run is always [`TaskResult::DryRun`]; otherwise any failed item
    /// makes the result [`TaskResult::Partial`].
    #[must_use]
    pub fn finish(self, ctx: &Context) -> TaskResult {
        ctx.log.info(&self.summary(ctx.dry_run));
        match (ctx.dry_run, self.failed) {
            (true, _) => TaskResult::DryRun,
            (false, 0) => TaskResult::Ok,
            (false, n) => TaskResult::Partial(format!("{n} item(s) failed")),
        }
    }
}

/// How [`process_resources`] treats the resources it is given.
///
/// ```
/// use envsetup::tasks::ProcessOpts;
///
/// assert!(ProcessOpts::apply_all("create").bail_on_error);
/// assert!(!ProcessOpts::apply_all("install").no_bail().bail_on_error);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ProcessOpts<'a> {
    /// Verb used in log lines, e.g. `install` or `create`.
    pub verb: &'a str,
    /// Stop at the first failed change instead of warning and moving on.
    pub bail_on_error: bool,
}

impl<'a> ProcessOpts<'a> {
    /// Apply every missing or incorrect resource; the first failure aborts.
    #[must_use]
    pub const fn apply_all(verb: &'a str) -> Self {
        Self {
            verb,
            bail_on_error: true,
        }
    }

    /// Count failures and keep going.
    #[must_use]
    pub const fn no_bail(self) -> Self {
        Self {
            bail_on_error: false,
            ..self
        }
    }
}

/// Check each resource and apply the ones that are not yet as desired.
///
/// # Errors
///
/// Returns an error if a resource's state cannot be read, or if a change
/// fails while `bail_on_error` is set.
pub fn process_resources<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    opts: &ProcessOpts,
) -> Result<TaskResult> {
    let mut stats = TaskStats::new();
    for resource in resources {
        let state = resource.current_state()?;
        stats.count(apply::settle(ctx, &resource, state, opts)?);
    }
    Ok(stats.finish(ctx))
}
