//! Versioned backup naming: `P.backup`, then `P.backup.1`, `P.backup.2`, …
//!
//! A backup is never overwritten. The most recent backup is the one with the
//! highest number, `P.backup` counting as number zero. Only canonical
//! numbers count: `P.backup.01` or `P.backup.+1` are someone else's files.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use crate::error::LinkError;

const SUFFIX: &str = ".backup";

/// An existing backup of some target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    /// `0` for `P.backup`, `N` for `P.backup.N`.
    pub generation: u32,
    /// The backup as found in the directory.
    pub path: PathBuf,
}

fn backup_name(target: &Path, generation: u32) -> Option<PathBuf> {
    let mut name = target.file_name()?.to_os_string();
    name.push(SUFFIX);
    if generation > 0 {
        name.push(format!(".{generation}"));
    }
    Some(target.with_file_name(name))
}

/// Generation encoded by what follows `P.backup`, if it is one of ours.
fn parse_generation(rest: &str) -> Option<u32> {
    if rest.is_empty() {
        return Some(0);
    }
    let digits = rest.strip_prefix('.')?;
    if digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Existing backups of `target`, oldest first.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be listed.
pub fn backups(target: &Path) -> Result<Vec<Backup>> {
    let (Some(parent), Some(file_name)) = (target.parent(), target.file_name()) else {
        return Ok(Vec::new());
    };
    let prefix = format!("{}{SUFFIX}", file_name.to_string_lossy());
    let entries = match std::fs::read_dir(parent) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("listing {}", parent.display()));
        }
    };

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("listing {}", parent.display()))?;
        let name = entry.file_name();
        let Some(generation) = name
            .to_str()
            .and_then(|n| n.strip_prefix(&prefix))
            .and_then(parse_generation)
        else {
            continue;
        };
        found.push(Backup {
            generation,
            path: entry.path(),
        });
    }
    found.sort_unstable_by_key(|b| b.generation);
    Ok(found)
}

/// The first unused backup path for `target`.
///
/// # Errors
///
/// Returns an error if existing backups cannot be listed, `target` has no
/// file name, or the highest generation is already `u32::MAX`
/// ([`LinkError::BackupsExhausted`]).
pub fn next_backup_path(target: &Path) -> Result<PathBuf> {
    let generation = match backups(target)?.last() {
        None => 0,
        Some(newest) => newest
            .generation
            .checked_add(1)
            .ok_or_else(|| LinkError::BackupsExhausted(target.to_path_buf()))?,
    };
    backup_name(target, generation)
        .with_context(|| format!("no file name: {}", target.display()))
}

/// The most recent backup of `target`, if any.
///
/// # Errors
///
/// Returns an error if existing backups cannot be listed.
pub fn latest_backup(target: &Path) -> Result<Option<PathBuf>> {
    Ok(backups(target)?.pop().map(|b| b.path))
}

/// Move `target` to its next free backup path and return that path.
///
/// # Errors
///
/// Returns [`LinkError::Backup`] if the rename fails.
pub fn back_up(target: &Path) -> Result<PathBuf> {
    let backup = next_backup_path(target)?;
    std::fs::rename(target, &backup).map_err(|source| LinkError::Backup {
        target: target.to_path_buf(),
        backup: backup.clone(),
        source,
    })?;
    Ok(backup)
}

/// Move `backup` back to `target`.
///
/// Returns `false` and leaves both alone when `target` is occupied.
///
/// # Errors
///
/// Returns an error if the rename fails.
pub fn restore(backup: &Path, target: &Path) -> Result<bool> {
    if super::helpers::fs::occupied(target) {
        return Ok(false);
    }
    std::fs::rename(backup, target).with_context(|| {
        format!("restoring {} to {}", backup.display(), target.display())
    })?;
    Ok(true)
}
