//! Third-party tools: a capability check plus a pluggable install strategy.
use anyhow::{Context as _, Result};
use std::fmt;
use std::path::{Path, PathBuf};

use super::helpers::fs::{ensure_parent_dir, make_executable};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;
use crate::net::{self, Downloader};
use crate::platform::Platform;

/// A `major.minor.patch` version.
///
/// # Examples
///
/// ```
/// use envsetup::resources::tool::Version;
///
/// let v = Version::parse("NVIM v0.9.5").unwrap();
/// assert_eq!(v, Version(0, 9, 5));
/// assert!(v >= Version(0, 9, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version(pub u64, pub u64, pub u64);

impl Version {
    /// Find the first version-looking token in `text`.
    ///
    /// Accepts a leading `v` and ignores pre-release or build suffixes; a
    /// missing patch component counts as zero.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        text.split_whitespace().find_map(|token| {
            let token = token.strip_prefix('v').unwrap_or(token);
            let core = token.split(['-', '+']).next()?;
            let mut parts = core.split('.').map(|p| p.parse::<u64>().ok());
            let major = parts.next()??;
            let minor = parts.next()??;
            let patch = match parts.next() {
                Some(p) => p?,
                None => 0,
            };
            Some(Self(major, minor, patch))
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.0, self.1, self.2)
    }
}

/// How to tell whether a tool is already installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCheck {
    /// An executable on `PATH` or in `~/.local/bin`.
    Binary {
        /// Executable name.
        name: String,
        /// Oldest acceptable version, checked with `<name> --version`.
        min_version: Option<Version>,
    },
    /// A directory that exists once the tool is installed.
    Directory(PathBuf),
}

/// Everything an [`InstallStrategy`] may use.
#[derive(Debug, Clone, Copy)]
pub struct Installer<'a> {
    /// Subprocess seam.
    pub executor: &'a dyn Executor,
    /// Network seam.
    pub downloader: &'a dyn Downloader,
    /// Home directory of the user being provisioned.
    pub home: &'a Path,
}

impl Installer<'_> {
    /// `~/.local/bin`.
    #[must_use]
    pub fn local_bin(&self) -> PathBuf {
        self.home.join(".local").join("bin")
    }
}

/// A way of installing a tool.
pub trait InstallStrategy: fmt::Debug + Send + Sync {
    /// Short description for log output.
    fn describe(&self) -> String;

    /// Perform the installation.
    ///
    /// # Errors
    ///
    /// Returns an error if the installation fails.
    fn install(&self, installer: &Installer<'_>) -> Result<()>;
}

/// `brew install <formula>`.
#[derive(Debug, Clone)]
pub struct Homebrew {
    /// Formula name.
    pub formula: String,
}

impl InstallStrategy for Homebrew {
    fn describe(&self) -> String {
        format!("brew install {}", self.formula)
    }

    fn install(&self, installer: &Installer<'_>) -> Result<()> {
        installer.executor.run("brew", &["install", &self.formula])?;
        Ok(())
    }
}

/// Fetch an installer script over HTTPS and run it with `sh`.
///
/// The placeholder `{bin}` in `args` expands to `~/.local/bin`.
#[derive(Debug, Clone)]
pub struct Script {
    /// Script URL.
    pub url: String,
    /// Arguments passed to the script.
    pub args: Vec<String>,
}

impl InstallStrategy for Script {
    fn describe(&self) -> String {
        format!("install script {}", self.url)
    }

    fn install(&self, installer: &Installer<'_>) -> Result<()> {
        let bin = installer.local_bin();
        std::fs::create_dir_all(&bin)
            .with_context(|| format!("creating directory: {}", bin.display()))?;
        let script = installer.downloader.fetch_string(&self.url)?;
        let bin = bin.display().to_string();
        let args: Vec<String> = self.args.iter().map(|a| a.replace("{bin}", &bin)).collect();
        let mut argv: Vec<&str> = vec!["-c", &script, "sh"];
        argv.extend(args.iter().map(String::as_str));
        installer.executor.run("sh", &argv)?;
        Ok(())
    }
}

/// Download a self-contained executable into place.
///
/// The download lands next to `dest` with a `.new` suffix and is only moved
/// over `dest` once complete and verified.
#[derive(Debug, Clone)]
pub struct AppImage {
    /// Download URL.
    pub url: String,
    /// URL of a `sha256sum`-style sidecar, if one is published.
    pub checksum_url: Option<String>,
    /// Final executable path.
    pub dest: PathBuf,
}

impl AppImage {
    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .dest
            .file_name()
            .map_or_else(Default::default, std::ffi::OsStr::to_os_string);
        name.push(".new");
        self.dest.with_file_name(name)
    }

    fn expected_checksum(&self, installer: &Installer<'_>) -> Option<String> {
        let checksum_url = self.checksum_url.as_deref()?;
        let asset = self.url.rsplit('/').next().unwrap_or(&self.url);
        match installer.downloader.fetch_string(checksum_url) {
            Ok(listing) => {
                let expected = net::parse_checksum(&listing, asset);
                if expected.is_none() {
                    tracing::warn!("no checksum listed for {asset}, skipping verification");
                }
                expected
            }
            Err(e) => {
                tracing::warn!("could not fetch checksum for {asset}, skipping verification: {e}");
                None
            }
        }
    }
}

impl InstallStrategy for AppImage {
    fn describe(&self) -> String {
        format!("download {}", self.url)
    }

    fn install(&self, installer: &Installer<'_>) -> Result<()> {
        ensure_parent_dir(&self.dest)?;
        let tmp = self.tmp_path();
        let installed = installer
            .downloader
            .fetch(&self.url, &tmp)
            .and_then(|()| {
                if let Some(expected) = self.expected_checksum(installer) {
                    net::verify_sha256(&tmp, &expected)?;
                }
                make_executable(&tmp)?;
                std::fs::rename(&tmp, &self.dest)
                    .with_context(|| format!("installing {}", self.dest.display()))
            });
        if installed.is_err() {
            let _ = std::fs::remove_file(&tmp);
        }
        installed
    }
}

/// Clone a git repository.
#[derive(Debug, Clone)]
pub struct GitClone {
    /// Repository URL.
    pub url: String,
    /// Checkout directory.
    pub dest: PathBuf,
}

impl InstallStrategy for GitClone {
    fn describe(&self) -> String {
        format!("git clone {}", self.url)
    }

    fn install(&self, installer: &Installer<'_>) -> Result<()> {
        ensure_parent_dir(&self.dest)?;
        installer.downloader.clone_repo(&self.url, &self.dest)
    }
}

/// A tool together with its check and install strategy.
#[derive(Debug)]
pub struct Tool {
    /// Display name.
    pub name: String,
    /// Installed-ness check.
    pub check: ToolCheck,
    /// How to install it.
    pub strategy: Box<dyn InstallStrategy>,
}

const STARSHIP_INSTALL_URL: &str = "https://starship.rs/install.sh";
const NEOVIM_RELEASE_URL: &str = "https://github.com/neovim/neovim/releases/latest/download";
const TPM_URL: &str = "https://github.com/tmux-plugins/tpm";

/// Oldest Neovim the linked configuration supports.
pub const NVIM_MIN_VERSION: Version = Version(0, 9, 0);

/// The tpm checkout directory under `home`.
#[must_use]
pub fn tpm_dir(home: &Path) -> PathBuf {
    home.join(".tmux").join("plugins").join("tpm")
}

fn nvim_asset(arch: &str) -> String {
    let arch = if arch == "aarch64" { "arm64" } else { "x86_64" };
    format!("nvim-linux-{arch}.appimage")
}

/// The prompt, editor and tmux plugin manager, with strategies for `platform`.
#[must_use]
pub fn default_tools(platform: &Platform, home: &Path) -> Vec<Tool> {
    let starship: Box<dyn InstallStrategy> = if platform.is_macos() {
        Box::new(Homebrew {
            formula: "starship".to_string(),
        })
    } else {
        Box::new(Script {
            url: STARSHIP_INSTALL_URL.to_string(),
            args: vec!["-y".to_string(), "-b".to_string(), "{bin}".to_string()],
        })
    };

    let nvim: Box<dyn InstallStrategy> = if platform.is_macos() {
        Box::new(Homebrew {
            formula: "neovim".to_string(),
        })
    } else {
        let asset = nvim_asset(std::env::consts::ARCH);
        Box::new(AppImage {
            url: format!("{NEOVIM_RELEASE_URL}/{asset}"),
            checksum_url: Some(format!("{NEOVIM_RELEASE_URL}/{asset}.sha256sum")),
            dest: home.join(".local").join("bin").join("nvim"),
        })
    };

    vec![
        Tool {
            name: "starship".to_string(),
            check: ToolCheck::Binary {
                name: "starship".to_string(),
                min_version: None,
            },
            strategy: starship,
        },
        Tool {
            name: "nvim".to_string(),
            check: ToolCheck::Binary {
                name: "nvim".to_string(),
                min_version: Some(NVIM_MIN_VERSION),
            },
            strategy: nvim,
        },
        Tool {
            name: "tpm".to_string(),
            check: ToolCheck::Directory(tpm_dir(home)),
            strategy: Box::new(GitClone {
                url: TPM_URL.to_string(),
                dest: tpm_dir(home),
            }),
        },
    ]
}

/// A [`Tool`] bound to the collaborators needed to check and install it.
#[derive(Debug)]
pub struct ToolResource<'a> {
    tool: &'a Tool,
    installer: Installer<'a>,
}

impl<'a> ToolResource<'a> {
    /// Create a new tool resource.
    #[must_use]
    pub const fn new(tool: &'a Tool, installer: Installer<'a>) -> Self {
        Self { tool, installer }
    }

    /// Resolve the program to invoke: `~/.local/bin/<name>` or PATH lookup.
    fn locate(&self, name: &str) -> Option<String> {
        let local = self.installer.local_bin().join(name);
        if local.is_file() {
            Some(local.display().to_string())
        } else if self.installer.executor.which(name) {
            Some(name.to_string())
        } else {
            None
        }
    }
}

impl Applicable for ToolResource<'_> {
    fn description(&self) -> String {
        format!("{} ({})", self.tool.name, self.tool.strategy.describe())
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.tool
            .strategy
            .install(&self.installer)
            .with_context(|| format!("installing {}", self.tool.name))?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for ToolResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        match &self.tool.check {
            ToolCheck::Directory(path) => Ok(if path.is_dir() {
                ResourceState::Correct
            } else {
                ResourceState::Missing
            }),
            ToolCheck::Binary { name, min_version } => {
                let Some(program) = self.locate(name) else {
                    return Ok(ResourceState::Missing);
                };
                let Some(min) = min_version else {
                    return Ok(ResourceState::Correct);
                };
                let version_run = self.installer.executor.run_unchecked(&program, &["--version"]);
                let output = match version_run {
                    Ok(output) => output,
                    Err(e) => {
                        return Ok(ResourceState::Incorrect {
                            current: format!("cannot run --version: {e:#}"),
                        });
                    }
                };
                // An unreadable version is accepted rather than reinstalled on every run.
                match Version::parse(&output.stdout) {
                    Some(found) if found < *min => Ok(ResourceState::Incorrect {
                        current: format!("version {found} (need {min})"),
                    }),
                    _ => Ok(ResourceState::Correct),
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::net::test_helpers::FakeDownloader;
    use crate::platform::Os;
    use crate::resources::test_helpers::MockExecutor;

    const HELLO_SHA: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    fn binary_tool(min: Option<Version>) -> Tool {
        Tool {
            name: "nvim".to_string(),
            check: ToolCheck::Binary {
                name: "nvim".to_string(),
                min_version: min,
            },
            strategy: Box::new(Homebrew {
                formula: "neovim".to_string(),
            }),
        }
    }

    #[test]
    fn version_parse_variants() {
        assert_eq!(Version::parse("NVIM v0.9.5"), Some(Version(0, 9, 5)));
        assert_eq!(Version::parse("starship 1.17.1"), Some(Version(1, 17, 1)));
        assert_eq!(Version::parse("tool 2.1"), Some(Version(2, 1, 0)));
        assert_eq!(
            Version::parse("NVIM v0.11.0-dev-123+gabc"),
            Some(Version(0, 11, 0))
        );
        assert_eq!(Version::parse("no version here"), None);
        assert_eq!(Version(0, 10, 0).to_string(), "0.10.0");
    }

    #[test]
    fn version_ordering_is_numeric() {
        assert!(Version(0, 10, 0) > Version(0, 9, 5));
        assert!(Version(1, 0, 0) > Version(0, 99, 99));
    }

    #[test]
    fn binary_missing_when_not_found() {
        let home = tempfile::tempdir().unwrap();
        let executor = MockExecutor::with_responses(vec![]);
        let downloader = FakeDownloader::default();
        let tool = binary_tool(None);
        let installer = Installer {
            executor: &executor,
            downloader: &downloader,
            home: home.path(),
        };
        let resource = ToolResource::new(&tool, installer);
        assert_eq!(resource.current_state().unwrap(), ResourceState::Missing);
    }

    #[test]
    fn binary_on_path_without_minimum_is_correct() {
        let home = tempfile::tempdir().unwrap();
        let executor = MockExecutor::with_responses(vec![]).with_available(&["nvim"]);
        let downloader = FakeDownloader::default();
        let tool = binary_tool(None);
        let installer = Installer {
            executor: &executor,
            downloader: &downloader,
            home: home.path(),
        };
        let resource = ToolResource::new(&tool, installer);
        assert_eq!(resource.current_state().unwrap(), ResourceState::Correct);
        assert_eq!(executor.call_count(), 0);
    }

    #[test]
    fn binary_too_old_is_incorrect() {
        let home = tempfile::tempdir().unwrap();
        let executor = MockExecutor::ok("NVIM v0.7.2\nBuild type: Release\n").with_available(&["nvim"]);
        let downloader = FakeDownloader::default();
        let tool = binary_tool(Some(NVIM_MIN_VERSION));
        let installer = Installer {
            executor: &executor,
            downloader: &downloader,
            home: home.path(),
        };
        let resource = ToolResource::new(&tool, installer);
        assert_eq!(
            resource.current_state().unwrap(),
            ResourceState::Incorrect {
                current: "version 0.7.2 (need 0.9.0)".to_string()
            }
        );
        assert_eq!(executor.calls(), vec!["nvim --version"]);
    }

    #[test]
    fn binary_in_local_bin_is_found() {
        let home = tempfile::tempdir().unwrap();
        let bin = home.path().join(".local/bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join("nvim"), "").unwrap();
        let executor = MockExecutor::ok("NVIM v0.10.1\n");
        let downloader = FakeDownloader::default();
        let tool = binary_tool(Some(NVIM_MIN_VERSION));
        let installer = Installer {
            executor: &executor,
            downloader: &downloader,
            home: home.path(),
        };
        let resource = ToolResource::new(&tool, installer);
        assert_eq!(resource.current_state().unwrap(), ResourceState::Correct);
        assert_eq!(
            executor.calls(),
            vec![format!("{} --version", bin.join("nvim").display())]
        );
    }

    #[test]
    fn directory_check() {
        let home = tempfile::tempdir().unwrap();
        let executor = MockExecutor::with_responses(vec![]);
        let downloader = FakeDownloader::default();
        let tool = Tool {
            name: "tpm".to_string(),
            check: ToolCheck::Directory(tpm_dir(home.path())),
            strategy: Box::new(GitClone {
                url: TPM_URL.to_string(),
                dest: tpm_dir(home.path()),
            }),
        };
        let installer = Installer {
            executor: &executor,
            downloader: &downloader,
            home: home.path(),
        };
        let resource = ToolResource::new(&tool, installer);
        assert_eq!(resource.current_state().unwrap(), ResourceState::Missing);
        assert_eq!(resource.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(resource.current_state().unwrap(), ResourceState::Correct);
        assert_eq!(downloader.requests(), vec![format!("clone {TPM_URL}")]);
    }

    #[test]
    fn script_strategy_runs_sh_with_bin_dir() {
        let home = tempfile::tempdir().unwrap();
        let executor = MockExecutor::ok("");
        let downloader =
            FakeDownloader::default().with_file(STARSHIP_INSTALL_URL, b"echo install");
        let installer = Installer {
            executor: &executor,
            downloader: &downloader,
            home: home.path(),
        };
        let strategy = Script {
            url: STARSHIP_INSTALL_URL.to_string(),
            args: vec!["-y".to_string(), "-b".to_string(), "{bin}".to_string()],
        };
        strategy.install(&installer).unwrap();
        let bin = home.path().join(".local/bin");
        assert!(bin.is_dir());
        assert_eq!(
            executor.calls(),
            vec![format!("sh -c echo install sh -y -b {}", bin.display())]
        );
    }

    #[test]
    fn script_strategy_download_failure() {
        let home = tempfile::tempdir().unwrap();
        let executor = MockExecutor::with_responses(vec![]);
        let downloader = FakeDownloader::default();
        let installer = Installer {
            executor: &executor,
            downloader: &downloader,
            home: home.path(),
        };
        let strategy = Script {
            url: STARSHIP_INSTALL_URL.to_string(),
            args: vec![],
        };
        assert!(strategy.install(&installer).is_err());
        assert_eq!(executor.call_count(), 0);
    }

    fn appimage(home: &Path) -> AppImage {
        AppImage {
            url: "https://dl/nvim-linux-x86_64.appimage".to_string(),
            checksum_url: Some("https://dl/nvim-linux-x86_64.appimage.sha256sum".to_string()),
            dest: home.join(".local/bin/nvim"),
        }
    }

    #[test]
    fn appimage_verified_and_executable() {
        use std::os::unix::fs::PermissionsExt as _;
        let home = tempfile::tempdir().unwrap();
        let executor = MockExecutor::with_responses(vec![]);
        let downloader = FakeDownloader::default()
            .with_file("https://dl/nvim-linux-x86_64.appimage", b"hello")
            .with_file(
                "https://dl/nvim-linux-x86_64.appimage.sha256sum",
                format!("{HELLO_SHA}  nvim-linux-x86_64.appimage\n").as_bytes(),
            );
        let installer = Installer {
            executor: &executor,
            downloader: &downloader,
            home: home.path(),
        };
        let strategy = appimage(home.path());
        strategy.install(&installer).unwrap();
        let dest = home.path().join(".local/bin/nvim");
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "hello");
        let mode = std::fs::metadata(&dest).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
        assert!(!home.path().join(".local/bin/nvim.new").exists());
    }

    #[test]
    fn appimage_checksum_mismatch_leaves_nothing() {
        let home = tempfile::tempdir().unwrap();
        let executor = MockExecutor::with_responses(vec![]);
        let downloader = FakeDownloader::default()
            .with_file("https://dl/nvim-linux-x86_64.appimage", b"tampered")
            .with_file(
                "https://dl/nvim-linux-x86_64.appimage.sha256sum",
                format!("{HELLO_SHA}  nvim-linux-x86_64.appimage\n").as_bytes(),
            );
        let installer = Installer {
            executor: &executor,
            downloader: &downloader,
            home: home.path(),
        };
        let err = appimage(home.path()).install(&installer).unwrap_err();
        assert!(err.to_string().contains("checksum mismatch"), "{err}");
        assert!(!home.path().join(".local/bin/nvim").exists());
        assert!(!home.path().join(".local/bin/nvim.new").exists());
    }

    #[test]
    fn appimage_without_sidecar_still_installs() {
        let home = tempfile::tempdir().unwrap();
        let executor = MockExecutor::with_responses(vec![]);
        let downloader =
            FakeDownloader::default().with_file("https://dl/nvim-linux-x86_64.appimage", b"x");
        let installer = Installer {
            executor: &executor,
            downloader: &downloader,
            home: home.path(),
        };
        appimage(home.path()).install(&installer).unwrap();
        assert!(home.path().join(".local/bin/nvim").is_file());
    }

    #[test]
    fn appimage_sidecar_without_our_asset_installs_unverified() {
        let home = tempfile::tempdir().unwrap();
        let executor = MockExecutor::with_responses(vec![]);
        let listing = format!(
            "{}  nvim-macos-arm64.tar.gz\n{}  nvim-linux-arm64.appimage\n",
            "a".repeat(64),
            "b".repeat(64)
        );
        let downloader = FakeDownloader::default()
            .with_file("https://dl/nvim-linux-x86_64.appimage", b"x")
            .with_file(
                "https://dl/nvim-linux-x86_64.appimage.sha256sum",
                listing.as_bytes(),
            );
        let installer = Installer {
            executor: &executor,
            downloader: &downloader,
            home: home.path(),
        };
        appimage(home.path()).install(&installer).unwrap();
        assert_eq!(
            std::fs::read_to_string(home.path().join(".local/bin/nvim")).unwrap(),
            "x"
        );
    }

    #[test]
    fn appimage_failed_move_removes_download() {
        let home = tempfile::tempdir().unwrap();
        let dest = home.path().join(".local/bin/nvim");
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("keep"), "").unwrap();
        let executor = MockExecutor::with_responses(vec![]);
        let downloader =
            FakeDownloader::default().with_file("https://dl/nvim-linux-x86_64.appimage", b"x");
        let installer = Installer {
            executor: &executor,
            downloader: &downloader,
            home: home.path(),
        };
        assert!(appimage(home.path()).install(&installer).is_err());
        assert!(!home.path().join(".local/bin/nvim.new").exists());
        assert!(dest.join("keep").exists());
    }

    #[test]
    fn unrunnable_binary_needs_reinstall() {
        let home = tempfile::tempdir().unwrap();
        let bin = home.path().join(".local/bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join("nvim"), "truncated").unwrap();
        let executor = crate::exec::SystemExecutor;
        let downloader = FakeDownloader::default();
        let tool = binary_tool(Some(NVIM_MIN_VERSION));
        let installer = Installer {
            executor: &executor,
            downloader: &downloader,
            home: home.path(),
        };
        let state = ToolResource::new(&tool, installer).current_state().unwrap();
        assert!(
            matches!(&state, ResourceState::Incorrect { current } if current.starts_with("cannot run --version")),
            "{state:?}"
        );
    }

    #[test]
    fn default_tools_linux_and_macos() {
        let home = Path::new("/home/u");
        let linux = default_tools(&Platform::new(Os::Linux, None), home);
        let names: Vec<&str> = linux.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["starship", "nvim", "tpm"]);
        assert!(linux[0].strategy.describe().contains("starship.rs"));
        assert!(linux[1].strategy.describe().contains(".appimage"));

        let mac = default_tools(&Platform::new(Os::MacOs, None), home);
        assert_eq!(mac[0].strategy.describe(), "brew install starship");
        assert_eq!(mac[1].strategy.describe(), "brew install neovim");
        assert_eq!(mac[2].strategy.describe(), format!("git clone {TPM_URL}"));
    }

    #[test]
    fn nvim_asset_by_arch() {
        assert_eq!(nvim_asset("x86_64"), "nvim-linux-x86_64.appimage");
        assert_eq!(nvim_asset("aarch64"), "nvim-linux-arm64.appimage");
    }
}
