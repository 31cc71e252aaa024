//! Task: install third-party tools.
use anyhow::Result;

use super::{Context, ProcessOpts, Task, TaskResult, process_resources};
use crate::resources::tool::{ToolResource, default_tools};

/// Install the prompt, editor and tmux plugin manager when absent.
///
/// Install failures are warnings; the task then reports a partial result.
#[derive(Debug)]
pub struct InstallTools;

impl Task for InstallTools {
    fn name(&self) -> &'static str {
        "Install tools"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let tools = default_tools(&ctx.platform, ctx.home());
        let installer = ctx.installer();
        process_resources(
            ctx,
            tools.iter().map(|tool| ToolResource::new(tool, installer)),
            &ProcessOpts::apply_all("install").no_bail(),
        )
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::net::test_helpers::FakeDownloader;
    use crate::platform::{Os, Platform};
    use crate::resources::test_helpers::MockExecutor;
    use crate::tasks::test_helpers::{empty_config, make_context, test_env};
    use std::path::PathBuf;
    use std::sync::Arc;

    fn install_everything(home: &std::path::Path) {
        let bin = home.join(".local/bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join("starship"), "").unwrap();
        std::fs::write(bin.join("nvim"), "").unwrap();
        std::fs::create_dir_all(home.join(".tmux/plugins/tpm")).unwrap();
    }

    #[test]
    fn already_installed_tools_are_left_alone() {
        let home = tempfile::tempdir().unwrap();
        install_everything(home.path());
        let executor = Arc::new(MockExecutor::ok("NVIM v0.10.2\n"));
        let downloader = Arc::new(FakeDownloader::default());
        let (ctx, _) = make_context(
            empty_config(PathBuf::from("/tmp")),
            Platform::new(Os::Linux, None),
            test_env(home.path()),
            Arc::clone(&executor) as Arc<dyn crate::exec::Executor>,
            Arc::clone(&downloader) as Arc<dyn crate::net::Downloader>,
        );
        assert_eq!(InstallTools.run(&ctx).unwrap(), TaskResult::Ok);
        assert_eq!(executor.call_count(), 1, "only the nvim version check");
        assert!(downloader.requests().is_empty());
    }

    #[test]
    fn install_failures_are_partial() {
        let home = tempfile::tempdir().unwrap();
        let executor = Arc::new(MockExecutor::with_responses(vec![]));
        let downloader = Arc::new(FakeDownloader::default().failing_clones());
        let (ctx, _) = make_context(
            empty_config(PathBuf::from("/tmp")),
            Platform::new(Os::Linux, None),
            test_env(home.path()),
            executor,
            Arc::clone(&downloader) as Arc<dyn crate::net::Downloader>,
        );
        let result = InstallTools.run(&ctx).unwrap();
        assert!(matches!(result, TaskResult::Partial(_)), "{result:?}");
        assert_eq!(downloader.requests().len(), 3);
    }

    #[test]
    fn dry_run_installs_nothing() {
        let home = tempfile::tempdir().unwrap();
        let executor = Arc::new(MockExecutor::with_responses(vec![]));
        let downloader = Arc::new(FakeDownloader::default());
        let (mut ctx, _) = make_context(
            empty_config(PathBuf::from("/tmp")),
            Platform::new(Os::Linux, None),
            test_env(home.path()),
            executor,
            Arc::clone(&downloader) as Arc<dyn crate::net::Downloader>,
        );
        ctx.dry_run = true;
        assert_eq!(InstallTools.run(&ctx).unwrap(), TaskResult::DryRun);
        assert!(downloader.requests().is_empty());
        assert!(!home.path().join(".tmux").exists());
    }

    #[test]
    fn unrunnable_binary_is_a_warning_not_a_failure() {
        let home = tempfile::tempdir().unwrap();
        install_everything(home.path());
        let downloader = Arc::new(FakeDownloader::default());
        let (ctx, _) = make_context(
            empty_config(PathBuf::from("/tmp")),
            Platform::new(Os::Linux, None),
            test_env(home.path()),
            Arc::new(crate::exec::SystemExecutor),
            Arc::clone(&downloader) as Arc<dyn crate::net::Downloader>,
        );
        let result = InstallTools.run(&ctx).unwrap();
        assert!(matches!(result, TaskResult::Partial(_)), "{result:?}");
        assert_eq!(downloader.requests().len(), 1, "only the nvim download");
    }
}
