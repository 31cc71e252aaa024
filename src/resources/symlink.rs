//! Symlink resource and target inspection.
use anyhow::{Context as _, Result};
use std::io;
use std::path::{Path, PathBuf};

use super::helpers::fs::ensure_parent_dir;
use super::{Applicable, ResourceChange};
use crate::error::LinkError;

/// What currently occupies a link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
    /// Nothing at the path.
    Absent,
    /// A symlink pointing at the expected source.
    Linked,
    /// A symlink pointing somewhere else (possibly dangling).
    ForeignLink(PathBuf),
    /// A regular file (or anything else that is not a directory or symlink).
    File,
    /// A real, empty directory.
    EmptyDir,
    /// A real directory with contents.
    Dir,
}

/// Classify `target` relative to the expected link `source`.
///
/// # Errors
///
/// Returns an error if the target's metadata or directory listing cannot be
/// read for a reason other than the target being absent.
pub fn inspect(target: &Path, source: &Path) -> Result<TargetKind> {
    let meta = match target.symlink_metadata() {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(TargetKind::Absent),
        Err(e) => {
            return Err(e).with_context(|| format!("reading metadata: {}", target.display()));
        }
    };

    if meta.file_type().is_symlink() {
        let existing = std::fs::read_link(target)
            .with_context(|| format!("reading link: {}", target.display()))?;
        return Ok(if existing == source {
            TargetKind::Linked
        } else {
            TargetKind::ForeignLink(existing)
        });
    }

    if meta.is_dir() {
        let mut entries = std::fs::read_dir(target)
            .with_context(|| format!("reading directory: {}", target.display()))?;
        return Ok(if entries.next().is_none() {
            TargetKind::EmptyDir
        } else {
            TargetKind::Dir
        });
    }

    Ok(TargetKind::File)
}

/// A symlink at `target` pointing at the absolute `source` path.
#[derive(Debug, Clone)]
pub struct SymlinkResource {
    /// The package file the link points to.
    pub source: PathBuf,
    /// Where the link lives.
    pub target: PathBuf,
}

impl SymlinkResource {
    /// Create a new symlink resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }

    /// Remove the link if, and only if, it points at our source.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot be inspected or removed.
    pub fn remove(&self) -> Result<ResourceChange> {
        if inspect(&self.target, &self.source)? != TargetKind::Linked {
            return Ok(ResourceChange::Skipped {
                reason: "not linked to this package".to_string(),
            });
        }
        std::fs::remove_file(&self.target)
            .with_context(|| format!("removing link: {}", self.target.display()))?;
        Ok(ResourceChange::Applied)
    }
}

impl Applicable for SymlinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    /// Create the link, replacing a foreign symlink or an empty directory.
    ///
    /// Regular files must have been moved aside first; they are never
    /// overwritten here.
    fn apply(&self) -> Result<ResourceChange> {
        match inspect(&self.target, &self.source)? {
            TargetKind::Linked => return Ok(ResourceChange::AlreadyCorrect),
            TargetKind::Dir => {
                return Err(LinkError::DirectoryConflict {
                    target: self.target.clone(),
                }
                .into());
            }
            TargetKind::File => {
                return Err(LinkError::Occupied {
                    target: self.target.clone(),
                }
                .into());
            }
            TargetKind::ForeignLink(_) => std::fs::remove_file(&self.target)
                .with_context(|| format!("removing link: {}", self.target.display()))?,
            TargetKind::EmptyDir => std::fs::remove_dir(&self.target)
                .with_context(|| format!("removing directory: {}", self.target.display()))?,
            TargetKind::Absent => {}
        }

        ensure_parent_dir(&self.target)?;
        std::os::unix::fs::symlink(&self.source, &self.target).map_err(|source| {
            LinkError::CreateLink {
                target: self.target.clone(),
                source_path: self.source.clone(),
                source,
            }
        })?;
        Ok(ResourceChange::Applied)
    }
}
