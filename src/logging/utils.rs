//! Log file location, ANSI stripping and timestamps.
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

/// Clock format used on every log file line.
pub(super) const CLOCK: &str = "%H:%M:%S";
/// Date and time format used in the log file header.
pub(super) const STAMP: &str = "%Y-%m-%d %H:%M:%S";

/// Current UTC time rendered with a `chrono` format string.
pub(super) fn utc_now(format: &str) -> String {
    chrono::Utc::now().format(format).to_string()
}

/// Remove terminal escape sequences.
///
/// A CSI sequence (`ESC [`) runs up to its final byte in `@`..`~`; any other
/// escape swallows the single character after `ESC`.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some((plain, tail)) = rest.split_once('\x1b') {
        out.push_str(plain);
        let mut chars = tail.chars();
        rest = match chars.next() {
            Some('[') => {
                let body = chars.as_str();
                body.find(|c: char| ('@'..='~').contains(&c))
                    .map_or("", |end| body.get(end + 1..).unwrap_or(""))
            }
            _ => chars.as_str(),
        };
    }
    out.push_str(rest);
    out
}

/// Base cache directory: `$XDG_CACHE_HOME`, else `$HOME/.cache`.
fn cache_root(var: impl Fn(&str) -> Option<OsString>) -> PathBuf {
    var("XDG_CACHE_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| var("HOME").map(|home| PathBuf::from(home).join(".cache")))
        .unwrap_or_else(|| PathBuf::from(".cache"))
}

/// `<cache>/envsetup/<command>.log`, with the directory created.
///
/// `None` when the directory cannot be created; the run then goes without a
/// log file.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    let dir = cache_root(|key| std::env::var_os(key)).join("envsetup");
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{command}.log")))
}
