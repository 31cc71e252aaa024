//! Task outcomes as they appear in the run summary, and the [`Log`] trait.
use std::fmt::Write as _;

/// One line of the run summary.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// Task name as shown in the summary.
    pub name: String,
    /// Final status of the task.
    pub status: TaskStatus,
    /// Skip reason, partial-failure note or error chain.
    pub message: Option<String>,
}

impl TaskEntry {
    /// Colored summary line: icon, name and the optional message.
    #[must_use]
    pub fn summary_line(&self) -> String {
        let suffix = self
            .message
            .as_ref()
            .map_or_else(String::new, |msg| format!(" ({msg})"));
        format!(
            "{}{} {}{suffix}\x1b[0m",
            self.status.color(),
            self.status.icon(),
            self.name
        )
    }
}

/// Outcome of one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Everything the task manages is in place.
    Ok,
    /// Nothing to do for this profile or machine (no packages listed, no zsh).
    NotApplicable,
    /// The task chose not to run (no package manager, no privilege, no tpm).
    Skipped,
    /// Changes were only reported.
    DryRun,
    /// Some items failed and were downgraded to warnings.
    Partial,
    /// The task failed; the run stops here.
    Failed,
}

impl TaskStatus {
    /// Summary order.
    pub const ALL: [Self; 6] = [
        Self::Ok,
        Self::NotApplicable,
        Self::Skipped,
        Self::DryRun,
        Self::Partial,
        Self::Failed,
    ];

    const fn icon(self) -> &'static str {
        match self {
            Self::Ok => "✓",
            Self::NotApplicable => "·",
            Self::Skipped => "○",
            Self::DryRun => "~",
            Self::Partial => "!",
            Self::Failed => "✗",
        }
    }

    const fn color(self) -> &'static str {
        match self {
            Self::Ok => "\x1b[32m",
            Self::NotApplicable => "\x1b[2m",
            Self::Skipped | Self::Partial => "\x1b[33m",
            Self::DryRun => "\x1b[37m",
            Self::Failed => "\x1b[31m",
        }
    }

    /// Word used in the totals line.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NotApplicable => "n/a",
            Self::Skipped => "skipped",
            Self::DryRun => "dry-run",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }
}

/// Totals line of the summary, e.g. `4 tasks: 3 ok, 1 partial`.
///
/// Statuses that did not occur are left out.
#[must_use]
pub fn summary_totals(entries: &[TaskEntry]) -> String {
    let mut line = format!("{} tasks:", entries.len());
    let mut first = true;
    for status in TaskStatus::ALL {
        let count = entries.iter().filter(|e| e.status == status).count();
        if count == 0 {
            continue;
        }
        let sep = if first { " " } else { ", " };
        first = false;
        let _ = write!(
            line,
            "{sep}{}{count} {}\x1b[0m",
            status.color(),
            status.label()
        );
    }
    line
}

/// Abstraction over logging backends.
///
/// Task and linker code log through this trait so tests can swap in a
/// logger that writes to a temporary file.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a task result for the summary.
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>);
}
