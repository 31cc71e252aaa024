//! [`Logger`]: routes messages to `tracing` and keeps the task summary.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::{Log, TaskEntry, TaskStatus, summary_totals};
use super::utils::log_file_path;

/// The logger used by every command.
///
/// Messages become [`tracing`] events, which
/// [`init_subscriber`](super::init_subscriber) sends to the console and to
/// `<cache>/envsetup/<command>.log`. Task outcomes are kept for
/// [`print_summary`](Self::print_summary).
#[derive(Debug)]
pub struct Logger {
    tasks: Mutex<Vec<TaskEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Logger for `command`; the summary points at that command's log file.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self::with_log_file(log_file_path(command))
    }

    /// Logger whose summary names `log_file`, or no file at all.
    #[must_use]
    pub const fn with_log_file(log_file: Option<PathBuf>) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            log_file,
        }
    }

    /// Log file named in the summary.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Snapshot of the recorded tasks, in run order.
    #[must_use]
    pub fn task_entries(&self) -> Vec<TaskEntry> {
        self.tasks
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Section header.
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Plain progress line.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Shown on the console only with `--verbose`; always written to the file.
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Problem that does not fail the task.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Error line.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// A change that would have been made without `--dry-run`.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Remember a task outcome for the summary.
    pub fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        let entry = TaskEntry {
            name: name.to_owned(),
            status,
            message: message.map(str::to_owned),
        };
        if let Ok(mut entries) = self.tasks.lock() {
            entries.push(entry);
        }
    }

    /// The first recorded task that failed, if any.
    #[must_use]
    pub fn first_failure(&self) -> Option<TaskEntry> {
        self.tasks
            .lock()
            .ok()?
            .iter()
            .find(|t| t.status == TaskStatus::Failed)
            .cloned()
    }

    /// Print one line per recorded task, the totals and the log file path.
    pub fn print_summary(&self) {
        let tasks = self.task_entries();
        if tasks.is_empty() {
            return;
        }

        self.stage("Summary");
        for task in &tasks {
            self.info(&task.summary_line());
        }
        self.info(&summary_totals(&tasks));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    fn stage(&self, msg: &str) {
        Self::stage(self, msg);
    }
    fn info(&self, msg: &str) {
        Self::info(self, msg);
    }
    fn debug(&self, msg: &str) {
        Self::debug(self, msg);
    }
    fn warn(&self, msg: &str) {
        Self::warn(self, msg);
    }
    fn error(&self, msg: &str) {
        Self::error(self, msg);
    }
    fn dry_run(&self, msg: &str) {
        Self::dry_run(self, msg);
    }
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        Self::record_task(self, name, status, message);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;
    use std::fs;

    #[test]
    fn logger_new_has_no_tasks() {
        let (log, _tmp, _guard) = isolated_logger();
        assert!(log.task_entries().is_empty(), "expected empty task list");
    }

    #[test]
    fn record_task_with_message() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_task("Install tools", TaskStatus::Skipped, Some("no tools"));
        let tasks = log.task_entries();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "Install tools");
        assert_eq!(tasks[0].message, Some("no tools".to_string()));
    }

    #[test]
    fn partial_is_not_a_failure() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_task("Link packages", TaskStatus::Partial, Some("1 failed"));
        assert!(log.first_failure().is_none());
        log.record_task("Install system packages", TaskStatus::Failed, None);
        log.record_task("Install tools", TaskStatus::Failed, None);
        assert_eq!(log.first_failure().unwrap().name, "Install system packages");
    }

    #[test]
    fn log_trait_delegates_to_logger() {
        let (log, _tmp, _guard) = isolated_logger();
        let log_ref: &dyn Log = &log;
        log_ref.record_task("via-trait", TaskStatus::Ok, None);
        assert_eq!(log.task_entries().len(), 1);
    }

    #[test]
    fn debug_always_written_to_file() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("debug-marker-{}", std::process::id());
        log.debug(&marker);
        let contents = fs::read_to_string(log.log_path().unwrap()).unwrap();
        assert!(contents.contains("[debug]"));
        assert!(contents.contains(&marker));
    }

    #[test]
    fn warn_written_to_file() {
        let (log, _tmp, _guard) = isolated_logger();
        log.warn("backed up ~/.tmux.conf");
        let contents = fs::read_to_string(log.log_path().unwrap()).unwrap();
        assert!(contents.contains("[warn] backed up ~/.tmux.conf"));
    }

    #[test]
    fn stage_written_to_file_with_arrow() {
        let (log, _tmp, _guard) = isolated_logger();
        log.stage("Link packages");
        let contents = fs::read_to_string(log.log_path().unwrap()).unwrap();
        assert!(contents.contains("==> Link packages"));
    }

    #[test]
    fn dry_run_written_to_file() {
        let (log, _tmp, _guard) = isolated_logger();
        log.dry_run("would link ~/.zshrc");
        let contents = fs::read_to_string(log.log_path().unwrap()).unwrap();
        assert!(contents.contains("[dry run] would link ~/.zshrc"));
    }

    #[test]
    fn summary_strips_ansi_in_file() {
        let (log, _tmp, _guard) = isolated_logger();
        log.record_task("Link packages", TaskStatus::Ok, None);
        log.print_summary();
        let contents = fs::read_to_string(log.log_path().unwrap()).unwrap();
        assert!(contents.contains("✓ Link packages"));
        assert!(!contents.contains('\x1b'), "ANSI codes must be stripped");
    }
}
