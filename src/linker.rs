//! The dotfile linker: mirror every file of a package into the home
//! directory as a symlink, moving pre-existing regular files aside first.
//!
//! Linking is idempotent. A target that already points at the right package
//! file is left alone and never backed up again; a symlink pointing anywhere
//! else is replaced without a backup.
use anyhow::{Context as _, Result, bail};
use std::ffi::OsString;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Package;
use crate::error::LinkError;
use crate::logging::Log;
use crate::resources::backup;
use crate::resources::helpers::fs::display_home;
use crate::resources::symlink::{SymlinkResource, TargetKind, inspect};
use crate::resources::{Applicable as _, ResourceChange};

/// Path components starting with this prefix are linked with a leading `.`.
const DOT_PREFIX: &str = "dot-";

/// Counters for one package.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkCounts {
    /// Links created (or planned, in dry-run mode).
    pub linked: usize,
    /// Targets that were already correct.
    pub unchanged: usize,
    /// Regular files moved to a backup path.
    pub backed_up: usize,
    /// Links removed by an unlink.
    pub removed: usize,
    /// Backups moved back into place by an unlink.
    pub restored: usize,
}

impl std::ops::AddAssign for LinkCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.linked += rhs.linked;
        self.unchanged += rhs.unchanged;
        self.backed_up += rhs.backed_up;
        self.removed += rhs.removed;
        self.restored += rhs.restored;
    }
}

/// What happened to one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageOutcome {
    /// The package was processed.
    Done(LinkCounts),
    /// The package was not processed (directory absent).
    Skipped(String),
    /// Processing the package failed; other packages were still processed.
    Failed(String),
}

/// Outcome for a named package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    /// Package name.
    pub name: String,
    /// Outcome.
    pub outcome: PackageOutcome,
}

/// Per-package results of a link or unlink run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkReport {
    /// One entry per requested package.
    pub packages: Vec<PackageReport>,
}

impl LinkReport {
    /// Packages that failed.
    pub fn failures(&self) -> impl Iterator<Item = &PackageReport> {
        self.packages
            .iter()
            .filter(|p| matches!(p.outcome, PackageOutcome::Failed(_)))
    }

    /// Whether any package failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Counters summed over all processed packages.
    #[must_use]
    pub fn totals(&self) -> LinkCounts {
        let mut totals = LinkCounts::default();
        for report in &self.packages {
            if let PackageOutcome::Done(counts) = report.outcome {
                totals += counts;
            }
        }
        totals
    }

    /// Outcome for `name`, if it was requested.
    #[must_use]
    pub fn outcome(&self, name: &str) -> Option<&PackageOutcome> {
        self.packages
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.outcome)
    }
}

/// The state of one package file's target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    /// Absolute package file.
    pub source: PathBuf,
    /// Link location under home.
    pub target: PathBuf,
    /// What occupies the target.
    pub kind: TargetKind,
}

/// Target states for one package; `files` is `None` when the package
/// directory is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageStatus {
    /// Package name.
    pub name: String,
    /// Whether the package is optional.
    pub optional: bool,
    /// Per-file state.
    pub files: Option<Vec<FileStatus>>,
}

/// Map a path relative to a package directory to its target under `home`.
///
/// Components starting with `dot-` get a leading `.` instead.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use envsetup::linker::target_for;
///
/// let home = Path::new("/home/me");
/// assert_eq!(
///     target_for(home, Path::new("dot-config/starship.toml")),
///     Path::new("/home/me/.config/starship.toml"),
/// );
/// assert_eq!(target_for(home, Path::new(".zshrc")), Path::new("/home/me/.zshrc"));
/// ```
#[must_use]
pub fn target_for(home: &Path, relative: &Path) -> PathBuf {
    let mut target = home.to_path_buf();
    for component in relative.components() {
        if let Component::Normal(name) = component {
            match name.to_str().and_then(|n| n.strip_prefix(DOT_PREFIX)) {
                Some(rest) if !rest.is_empty() => {
                    let mut dotted = OsString::from(".");
                    dotted.push(rest);
                    target.push(dotted);
                }
                _ => target.push(name),
            }
        }
    }
    target
}

/// List the links for every file in the package at `dir`.
///
/// Symlinks inside the package count as files; `.git` is ignored. Entries
/// are sorted by path.
///
/// # Errors
///
/// Returns an error if the package tree cannot be walked.
pub fn plan_package(dir: &Path, home: &Path) -> Result<Vec<SymlinkResource>> {
    let dir = std::path::absolute(dir)
        .with_context(|| format!("resolving package path: {}", dir.display()))?;
    let mut links = Vec::new();
    for entry in WalkDir::new(&dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git")
    {
        let entry = entry.with_context(|| format!("walking {}", dir.display()))?;
        if entry.file_type().is_dir() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(&dir)
            .with_context(|| format!("{} is outside {}", entry.path().display(), dir.display()))?;
        links.push(SymlinkResource::new(
            entry.path().to_path_buf(),
            target_for(home, relative),
        ));
    }
    Ok(links)
}

/// Links packages from a root directory into a home directory.
pub struct Linker<'a> {
    root: &'a Path,
    home: &'a Path,
    dry_run: bool,
    log: &'a dyn Log,
}

impl fmt::Debug for Linker<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Linker")
            .field("root", &self.root)
            .field("home", &self.home)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl<'a> Linker<'a> {
    /// Create a linker for packages under `root`, linking into `home`.
    #[must_use]
    pub const fn new(root: &'a Path, home: &'a Path, log: &'a dyn Log) -> Self {
        Self {
            root,
            home,
            dry_run: false,
            log,
        }
    }

    /// Only log what would be done.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn show(&self, path: &Path) -> String {
        display_home(path, self.home)
    }

    /// Resolve the package directory, logging and reporting an absent one.
    fn package_dir(&self, package: &Package) -> Result<PathBuf, PackageOutcome> {
        let dir = package.dir(self.root);
        if dir.is_dir() {
            return Ok(dir);
        }
        if package.optional {
            self.log
                .debug(&format!("optional package {} not present", package.name));
            Err(PackageOutcome::Skipped("optional, not present".to_string()))
        } else {
            self.log.warn(&format!(
                "package directory not found: {}",
                dir.display()
            ));
            Err(PackageOutcome::Skipped("package directory not found".to_string()))
        }
    }

    /// Link every package, in order.
    ///
    /// A failing package is reported in the returned [`LinkReport`] and the
    /// remaining packages are still processed.
    ///
    /// # Errors
    ///
    /// Currently infallible at the top level; per-package failures are part
    /// of the report.
    pub fn link(&self, packages: &[Package]) -> Result<LinkReport> {
        let mut report = LinkReport::default();
        for package in packages {
            let outcome = match self.package_dir(package) {
                Err(outcome) => outcome,
                Ok(dir) => match self.link_package(&dir) {
                    Ok(counts) => {
                        self.log.debug(&format!(
                            "{}: {} linked, {} unchanged, {} backed up",
                            package.name, counts.linked, counts.unchanged, counts.backed_up
                        ));
                        PackageOutcome::Done(counts)
                    }
                    Err(e) => {
                        self.log
                            .warn(&format!("failed to link package {}: {e:#}", package.name));
                        PackageOutcome::Failed(format!("{e:#}"))
                    }
                },
            };
            report.packages.push(PackageReport {
                name: package.name.clone(),
                outcome,
            });
        }
        Ok(report)
    }

    fn link_package(&self, dir: &Path) -> Result<LinkCounts> {
        let links = plan_package(dir, self.home)?;
        let mut kinds = Vec::with_capacity(links.len());
        for link in &links {
            let kind = inspect(&link.target, &link.source)?;
            match kind {
                TargetKind::Dir => {
                    return Err(LinkError::DirectoryConflict {
                        target: link.target.clone(),
                    }
                    .into());
                }
                TargetKind::File if resolves_to(&link.target, &link.source) => {
                    bail!(
                        "{} already resolves into the package through a linked parent directory",
                        link.target.display()
                    );
                }
                _ => kinds.push(kind),
            }
        }

        let mut counts = LinkCounts::default();
        if self.dry_run {
            for (link, kind) in links.iter().zip(&kinds) {
                match kind {
                    TargetKind::Linked => counts.unchanged += 1,
                    TargetKind::File => {
                        let backup = backup::next_backup_path(&link.target)?;
                        self.log.dry_run(&format!(
                            "would back up {} to {}",
                            self.show(&link.target),
                            self.show(&backup)
                        ));
                        counts.backed_up += 1;
                        counts.linked += 1;
                        self.log.dry_run(&format!("would link {}", link.description()));
                    }
                    _ => {
                        counts.linked += 1;
                        self.log.dry_run(&format!("would link {}", link.description()));
                    }
                }
            }
            return Ok(counts);
        }

        for (link, kind) in links.iter().zip(&kinds) {
            if *kind == TargetKind::File {
                let backup = backup::back_up(&link.target)?;
                self.log.warn(&format!(
                    "backed up {} to {}",
                    self.show(&link.target),
                    self.show(&backup)
                ));
                counts.backed_up += 1;
            }
        }

        for link in &links {
            match link.apply()? {
                ResourceChange::Applied => {
                    self.log.debug(&format!("linked {}", link.description()));
                    counts.linked += 1;
                }
                ResourceChange::AlreadyCorrect => counts.unchanged += 1,
                ResourceChange::Skipped { reason } => {
                    self.log.debug(&format!("skipped {}: {reason}", link.description()));
                }
            }
        }
        Ok(counts)
    }

    /// Remove every link that points into the given packages and restore the
    /// most recent backup of each target.
    ///
    /// Targets that are not links to the package file are never touched.
    ///
    /// # Errors
    ///
    /// Currently infallible at the top level; per-package failures are part
    /// of the report.
    pub fn unlink(&self, packages: &[Package]) -> Result<LinkReport> {
        let mut report = LinkReport::default();
        for package in packages {
            let outcome = match self.package_dir(package) {
                Err(outcome) => outcome,
                Ok(dir) => match self.unlink_package(&dir) {
                    Ok(counts) => PackageOutcome::Done(counts),
                    Err(e) => {
                        self.log
                            .warn(&format!("failed to unlink package {}: {e:#}", package.name));
                        PackageOutcome::Failed(format!("{e:#}"))
                    }
                },
            };
            report.packages.push(PackageReport {
                name: package.name.clone(),
                outcome,
            });
        }
        Ok(report)
    }

    fn unlink_package(&self, dir: &Path) -> Result<LinkCounts> {
        let mut counts = LinkCounts::default();
        for link in plan_package(dir, self.home)? {
            if self.dry_run {
                if inspect(&link.target, &link.source)? == TargetKind::Linked {
                    self.log
                        .dry_run(&format!("would remove {}", self.show(&link.target)));
                    counts.removed += 1;
                    if let Some(backup) = backup::latest_backup(&link.target)? {
                        self.log.dry_run(&format!(
                            "would restore {} from {}",
                            self.show(&link.target),
                            self.show(&backup)
                        ));
                        counts.restored += 1;
                    }
                }
                continue;
            }

            // An unreadable backup listing must leave the link in place.
            let latest = backup::latest_backup(&link.target)?;
            if link.remove()? != ResourceChange::Applied {
                continue;
            }
            self.log.debug(&format!("removed {}", self.show(&link.target)));
            counts.removed += 1;
            if let Some(backup) = latest
                && backup::restore(&backup, &link.target)?
            {
                self.log.info(&format!(
                    "restored {} from {}",
                    self.show(&link.target),
                    self.show(&backup)
                ));
                counts.restored += 1;
            }
        }
        Ok(counts)
    }

    /// Report the state of every target of the given packages.
    ///
    /// # Errors
    ///
    /// Returns an error if a package tree or a target cannot be read.
    pub fn inspect(&self, packages: &[Package]) -> Result<Vec<PackageStatus>> {
        packages
            .iter()
            .map(|package| {
                let dir = package.dir(self.root);
                let files = if dir.is_dir() {
                    let files = plan_package(&dir, self.home)?
                        .into_iter()
                        .map(|link| {
                            let kind = inspect(&link.target, &link.source)?;
                            Ok(FileStatus {
                                source: link.source,
                                target: link.target,
                                kind,
                            })
                        })
                        .collect::<Result<Vec<_>>>()?;
                    Some(files)
                } else {
                    None
                };
                Ok(PackageStatus {
                    name: package.name.clone(),
                    optional: package.optional,
                    files,
                })
            })
            .collect()
    }
}

/// Whether `target` is the same file as `source` once symlinks are resolved.
fn resolves_to(target: &Path, source: &Path) -> bool {
    match (target.canonicalize(), source.canonicalize()) {
        (Ok(t), Ok(s)) => t == s,
        _ => false,
    }
}
