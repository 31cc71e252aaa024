//! Network access behind the [`Downloader`] trait: HTTPS downloads with
//! retries, SHA-256 verification and git clones.
use anyhow::{Context as _, Result};
use std::fmt::Write as _;
use std::io::Read as _;
use std::path::Path;
use std::time::Duration;

use crate::error::InstallError;

/// Number of download attempts before giving up.
pub const RETRY_COUNT: u32 = 3;

/// Delay between download attempts.
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Abstraction over fetching things from the network.
pub trait Downloader: Send + Sync + std::fmt::Debug {
    /// Download `url` into the file at `dest`, replacing it.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Download`] once all attempts have failed, or an
    /// I/O error if `dest` cannot be written.
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;

    /// Download `url` as text.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Download`] once all attempts have failed.
    fn fetch_string(&self, url: &str) -> Result<String>;

    /// Clone the git repository at `url` into `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the clone fails.
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Production [`Downloader`] using `ureq` and `git2`.
#[derive(Debug, Clone, Copy)]
pub struct UreqDownloader {
    retry_delay: Duration,
}

impl Default for UreqDownloader {
    fn default() -> Self {
        Self {
            retry_delay: RETRY_DELAY,
        }
    }
}

impl Downloader for UreqDownloader {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        let bytes = with_retries(url, self.retry_delay, || {
            let mut resp = ureq::get(url).call()?;
            let mut buf = Vec::new();
            resp.body_mut().as_reader().read_to_end(&mut buf)?;
            Ok(buf)
        })?;
        std::fs::write(dest, bytes).with_context(|| format!("writing {}", dest.display()))
    }

    fn fetch_string(&self, url: &str) -> Result<String> {
        with_retries(url, self.retry_delay, || {
            let mut resp = ureq::get(url).call()?;
            Ok(resp.body_mut().read_to_string()?)
        })
    }

    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        git2::Repository::clone(url, dest)
            .with_context(|| format!("cloning {url} into {}", dest.display()))?;
        Ok(())
    }
}

/// Run `op` up to [`RETRY_COUNT`] times, sleeping `delay` between attempts.
///
/// # Errors
///
/// Returns [`InstallError::Download`] carrying the last failure.
pub fn with_retries<T>(
    url: &str,
    delay: Duration,
    mut op: impl FnMut() -> Result<T>,
) -> Result<T> {
    let mut last = String::new();
    for attempt in 1..=RETRY_COUNT {
        if attempt > 1 {
            tracing::debug!("retry {attempt}/{RETRY_COUNT} for {url} after {delay:?}");
            std::thread::sleep(delay);
        }
        match op() {
            Ok(value) => return Ok(value),
            Err(e) => last = format!("{e:#}"),
        }
    }
    Err(InstallError::Download {
        url: url.to_string(),
        attempts: RETRY_COUNT,
        reason: last,
    }
    .into())
}

/// Compute the lowercase hex SHA-256 digest of the file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn compute_sha256(path: &Path) -> Result<String> {
    use sha2::{Digest, Sha256};

    let bytes = std::fs::read(path)
        .with_context(|| format!("reading {} for checksum verification", path.display()))?;
    let digest = Sha256::digest(&bytes);
    let mut hex = String::with_capacity(64);
    for b in &digest {
        write!(hex, "{b:02x}").unwrap_or(());
    }
    Ok(hex)
}

/// Extract the digest for `asset` from a `sha256sum`-style listing.
///
/// A listing with a single entry is accepted whatever name it carries.
#[must_use]
pub fn parse_checksum(listing: &str, asset: &str) -> Option<String> {
    let lines: Vec<&str> = listing.lines().filter(|l| !l.trim().is_empty()).collect();
    let line = match lines.as_slice() {
        [only] => *only,
        many => many.iter().find(|l| l.contains(asset))?,
    };
    let digest = line.split_whitespace().next()?;
    (digest.len() == 64 && digest.chars().all(|c| c.is_ascii_hexdigit()))
        .then(|| digest.to_ascii_lowercase())
}

/// Check `path` against `expected`, deleting the file on mismatch.
///
/// # Errors
///
/// Returns [`InstallError::Checksum`] on mismatch.
pub fn verify_sha256(path: &Path, expected: &str) -> Result<()> {
    let actual = compute_sha256(path)?;
    if actual != expected {
        let _ = std::fs::remove_file(path);
        return Err(InstallError::Checksum {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        }
        .into());
    }
    Ok(())
}
