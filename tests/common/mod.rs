// Shared helpers for integration tests.
//
// Provides a temporary root + home pair, a fluent builder for package trees
// and conf files, and offline stand-ins for the subprocess and network seams.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};
use envsetup::cli::GlobalOpts;
use envsetup::commands::{CommandRunner, Host};
use envsetup::config::Environment;
use envsetup::exec::{ExecResult, Executor};
use envsetup::logging::Logger;
use envsetup::net::Downloader;
use envsetup::platform::{Os, Platform};

/// Executor for a machine with nothing on PATH: every command fails.
#[derive(Debug, Default)]
pub struct OfflineExecutor {
    calls: Mutex<Vec<String>>,
}

impl OfflineExecutor {
    /// Commands that were attempted, as `program arg…`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, program: &str, args: &[&str]) {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.calls.lock().unwrap().push(line);
    }
}

impl Executor for OfflineExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        self.record(program, args);
        bail!("{program}: not available in tests")
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        self.record(program, args);
        Ok(ExecResult {
            stdout: String::new(),
            stderr: format!("{program}: not available in tests"),
            success: false,
            code: Some(127),
        })
    }

    fn which(&self, _program: &str) -> bool {
        false
    }
}

/// Downloader without network access: every request fails.
#[derive(Debug, Default)]
pub struct OfflineDownloader {
    requests: Mutex<Vec<String>>,
}

impl OfflineDownloader {
    /// URLs that were requested.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Downloader for OfflineDownloader {
    fn fetch(&self, url: &str, _dest: &Path) -> Result<()> {
        self.requests.lock().unwrap().push(url.to_string());
        bail!("network disabled in tests: {url}")
    }

    fn fetch_string(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        bail!("network disabled in tests: {url}")
    }

    fn clone_repo(&self, url: &str, _dest: &Path) -> Result<()> {
        self.requests.lock().unwrap().push(url.to_string());
        bail!("network disabled in tests: {url}")
    }
}

/// An isolated root and home directory backed by a [`tempfile::TempDir`].
pub struct IntegrationTestContext {
    dir: tempfile::TempDir,
    /// Directory holding the packages and `conf/`.
    pub root: PathBuf,
    /// Home directory receiving the links.
    pub home: PathBuf,
    /// Whether the environment reports a constrained context.
    pub constrained: bool,
    /// Executor handed to the runner.
    pub executor: Arc<OfflineExecutor>,
    /// Downloader handed to the runner.
    pub downloader: Arc<OfflineDownloader>,
}

impl IntegrationTestContext {
    /// Create an empty root with `conf/` lists that install nothing, and an
    /// empty home.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let root = dir.path().join("root");
        let home = dir.path().join("home");
        std::fs::create_dir_all(root.join("conf")).expect("create conf dir");
        std::fs::create_dir_all(&home).expect("create home dir");
        for file in ["packages.toml", "system-packages.toml", "directories.toml"] {
            std::fs::write(root.join("conf").join(file), "").expect("write config file");
        }
        let root = std::fs::canonicalize(root).expect("canonicalize root");
        let home = std::fs::canonicalize(home).expect("canonicalize home");
        Self {
            dir,
            root,
            home,
            constrained: false,
            executor: Arc::new(OfflineExecutor::default()),
            downloader: Arc::new(OfflineDownloader::default()),
        }
    }

    /// Global options pointing at this context's root and home.
    pub fn global(&self) -> GlobalOpts {
        GlobalOpts {
            root: Some(self.root.clone()),
            home: Some(self.home.clone()),
            ..GlobalOpts::default()
        }
    }

    /// Build a runner for `global` on a Linux host without a package manager.
    pub fn runner(&self, global: &GlobalOpts) -> Result<(CommandRunner, Arc<Logger>)> {
        let log = Arc::new(Logger::with_log_file(None));
        let host = Host {
            root: global.root.clone().unwrap_or_else(|| self.root.clone()),
            env: Environment {
                home: self.home.clone(),
                constrained: self.constrained,
                ci: true,
                user: None,
                shell: Some(PathBuf::from("/bin/bash")),
            },
            platform: Platform::new(Os::Linux, None),
            executor: Arc::clone(&self.executor) as Arc<dyn Executor>,
            downloader: Arc::clone(&self.downloader) as Arc<dyn Downloader>,
        };
        let runner = CommandRunner::with_host(global, host, &log)?;
        Ok((runner, log))
    }

    /// Path of `rel` under home.
    pub fn home_path(&self, rel: &str) -> PathBuf {
        self.home.join(rel)
    }

    /// Path of `rel` inside package `package`.
    pub fn package_path(&self, package: &str, rel: &str) -> PathBuf {
        self.root.join(package).join(rel)
    }

    /// Read a file under home, following symlinks.
    pub fn read_home(&self, rel: &str) -> String {
        std::fs::read_to_string(self.home_path(rel)).expect("read home file")
    }

    /// Whether `rel` under home is a symlink pointing at `package/rel_in_package`.
    pub fn is_linked(&self, rel: &str, package: &str, rel_in_package: &str) -> bool {
        std::fs::read_link(self.home_path(rel))
            .is_ok_and(|target| target == self.package_path(package, rel_in_package))
    }

    /// Root of the temporary tree.
    pub fn tmp(&self) -> &Path {
        self.dir.path()
    }
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new context with empty lists.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Write `content` to `conf/<filename>`, replacing the empty default.
    pub fn with_config_file(self, filename: &str, content: &str) -> Self {
        let path = self.ctx.root.join("conf").join(filename);
        std::fs::write(path, content).expect("write config file");
        self
    }

    /// Create `rel` inside package `package` with `content`.
    pub fn with_package_file(self, package: &str, rel: &str, content: &str) -> Self {
        write_file(&self.ctx.package_path(package, rel), content);
        self
    }

    /// Create `rel` under home with `content`.
    pub fn with_home_file(self, rel: &str, content: &str) -> Self {
        write_file(&self.ctx.home_path(rel), content);
        self
    }

    /// Report a constrained context from the environment.
    pub fn constrained(mut self) -> Self {
        self.ctx.constrained = true;
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write file");
}
