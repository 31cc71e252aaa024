//! System package managers: query, refresh and batch install.
use std::collections::HashSet;
use std::fmt;

use anyhow::Result;

use crate::exec::Executor;

/// Supported system package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    /// Debian and Ubuntu (`apt-get`).
    Apt,
    /// Arch Linux (`pacman`).
    Pacman,
    /// Fedora and RHEL (`dnf`).
    Dnf,
    /// Homebrew on macOS or Linux.
    Brew,
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

impl PackageManager {
    /// Executable name looked up on PATH.
    #[must_use]
    pub const fn binary(self) -> &'static str {
        match self {
            Self::Apt => "apt-get",
            Self::Pacman => "pacman",
            Self::Dnf => "dnf",
            Self::Brew => "brew",
        }
    }

    /// Whether installing needs root. Homebrew refuses to run as root.
    #[must_use]
    pub const fn needs_privilege(self) -> bool {
        !matches!(self, Self::Brew)
    }

    /// Arguments placed between the binary and the package names.
    const fn install_args(self) -> &'static [&'static str] {
        match self {
            Self::Apt => &["install", "-y", "--no-install-recommends"],
            Self::Pacman => &["-S", "--needed", "--noconfirm"],
            Self::Dnf => &["install", "-y"],
            Self::Brew => &["install"],
        }
    }

    /// Arguments that refresh the package index before installing, for
    /// managers whose index starts out empty in a fresh container.
    const fn refresh_args(self) -> Option<&'static [&'static str]> {
        match self {
            Self::Apt => Some(&["update"]),
            Self::Pacman | Self::Dnf | Self::Brew => None,
        }
    }

    /// Command listing installed packages, and how to read its output.
    const fn query(self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::Apt => ("dpkg-query", &["-W", "-f=${db:Status-Status} ${Package}\n"]),
            Self::Pacman => ("pacman", &["-Qq"]),
            Self::Dnf => ("rpm", &["-qa", "--qf", "%{NAME}\n"]),
            Self::Brew => ("brew", &["list", "--formula", "-1"]),
        }
    }
}

/// How privileged commands are run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Privilege {
    /// Already running as root.
    Root,
    /// Through `sudo`; `non_interactive` adds `-n` so it never prompts.
    Sudo {
        /// Pass `-n` to sudo.
        non_interactive: bool,
    },
    /// No way to gain root.
    Unavailable(String),
}

impl Privilege {
    /// Work out how to gain root.
    ///
    /// In the constrained context only passwordless sudo counts, since no one
    /// is there to type a password.
    pub fn detect(executor: &dyn Executor, constrained: bool) -> Self {
        let is_root = executor
            .run_unchecked("id", &["-u"])
            .is_ok_and(|r| r.success && r.stdout.trim() == "0");
        if is_root {
            return Self::Root;
        }
        if !executor.which("sudo") {
            return Self::Unavailable("not root and sudo is not installed".to_string());
        }
        if !constrained {
            return Self::Sudo {
                non_interactive: false,
            };
        }
        if executor
            .run_unchecked("sudo", &["-n", "true"])
            .is_ok_and(|r| r.success)
        {
            Self::Sudo {
                non_interactive: true,
            }
        } else {
            Self::Unavailable("passwordless sudo is not available".to_string())
        }
    }

    /// Wrap `program args…` so that it runs as root.
    #[must_use]
    pub fn wrap<'a>(&self, program: &'a str, args: &[&'a str]) -> (&'a str, Vec<&'a str>) {
        match self {
            Self::Root | Self::Unavailable(_) => (program, args.to_vec()),
            Self::Sudo { non_interactive } => {
                let mut full = Vec::with_capacity(args.len() + 2);
                if *non_interactive {
                    full.push("-n");
                }
                full.push(program);
                full.extend_from_slice(args);
                ("sudo", full)
            }
        }
    }
}

/// Query the full set of installed package names with a single command.
///
/// A failing query yields an empty set, so every package is treated as
/// missing and the install command decides.
///
/// # Errors
///
/// Returns an error if the query program cannot be spawned.
pub fn get_installed_packages(
    manager: PackageManager,
    executor: &dyn Executor,
) -> Result<HashSet<String>> {
    let (program, args) = manager.query();
    let result = executor.run_unchecked(program, args)?;
    if !result.success {
        return Ok(HashSet::new());
    }
    let installed = match manager {
        PackageManager::Apt => result
            .stdout
            .lines()
            .filter_map(|line| line.strip_prefix("installed "))
            .map(|name| name.trim().to_string())
            .collect(),
        PackageManager::Pacman | PackageManager::Dnf | PackageManager::Brew => result
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect(),
    };
    Ok(installed)
}

/// Install `names` with one package-manager command, refreshing the
/// package index first where the manager needs it.
///
/// # Errors
///
/// Returns an error if the command fails.
pub fn batch_install_packages(
    manager: PackageManager,
    names: &[&str],
    privilege: &Privilege,
    executor: &dyn Executor,
) -> Result<()> {
    if names.is_empty() {
        return Ok(());
    }
    if let Some(refresh) = manager.refresh_args() {
        run_as_manager(manager, refresh, privilege, executor)?;
    }
    let mut args: Vec<&str> = manager.install_args().to_vec();
    args.extend_from_slice(names);
    run_as_manager(manager, &args, privilege, executor)
}

fn run_as_manager(
    manager: PackageManager,
    args: &[&str],
    privilege: &Privilege,
    executor: &dyn Executor,
) -> Result<()> {
    if manager.needs_privilege() {
        let (program, args) = privilege.wrap(manager.binary(), args);
        executor.run(program, &args)?;
    } else {
        executor.run(manager.binary(), args)?;
    }
    Ok(())
}
