//! Process environment captured once at startup.
use std::path::PathBuf;

use crate::error::PlatformError;

/// Values read from environment variables when the program starts.
///
/// Tasks receive this through the execution context; nothing below the
/// command layer reads environment variables itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Home directory that receives the links.
    pub home: PathBuf,
    /// Managed cloud container or explicitly constrained context.
    pub constrained: bool,
    /// Running under a CI system.
    pub ci: bool,
    /// Login name (`$USER`, else `$LOGNAME`), used to look up the passwd
    /// entry.
    pub user: Option<String>,
    /// `$SHELL`, if set. Only consulted when the passwd entry is unreadable.
    pub shell: Option<PathBuf>,
}

impl Environment {
    /// Build an environment from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::HomeNotSet`] if `HOME` is unset or empty.
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self, PlatformError> {
        let home = get("HOME")
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .ok_or(PlatformError::HomeNotSet)?;
        let constrained = get("CODESPACES").is_some_and(|v| v == "true")
            || get("ENVSETUP_CONSTRAINED").is_some_and(|v| is_truthy(&v));
        let ci = get("CI").is_some_and(|v| is_truthy(&v));
        let user = get("USER")
            .filter(|u| !u.is_empty())
            .or_else(|| get("LOGNAME").filter(|u| !u.is_empty()));
        let shell = get("SHELL").filter(|s| !s.is_empty()).map(PathBuf::from);
        Ok(Self {
            home,
            constrained,
            ci,
            user,
            shell,
        })
    }

    /// Force the constrained context on.
    #[must_use]
    pub const fn constrained(mut self, on: bool) -> Self {
        self.constrained |= on;
        self
    }

    /// Profile used when none is given on the command line.
    #[must_use]
    pub const fn default_profile(&self) -> &'static str {
        if self.constrained {
            "headless"
        } else {
            "interactive"
        }
    }
}

/// Interpret `1`, `true`, `yes` and `on` (any case) as true.
#[must_use]
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
