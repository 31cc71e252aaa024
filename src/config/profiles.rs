//! Profile definitions and resolution to active categories.
use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

use super::toml_loader::load_config_or;
use crate::error::ConfigError;
use crate::platform::Platform;

/// A resolved profile with its active and excluded categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Profile name.
    pub name: String,
    /// Categories whose config sections apply.
    pub active_categories: Vec<String>,
    /// Categories explicitly switched off.
    pub excluded_categories: Vec<String>,
}

/// Raw profile definition from `profiles.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
struct ProfileDef {
    #[serde(default)]
    include: Vec<String>,
    #[serde(default)]
    exclude: Vec<String>,
}

const DEFAULT_PROFILES: &str = r#"
[interactive]
include = ["terminal"]

[headless]
exclude = ["terminal"]
"#;

/// Categories added or excluded automatically from the detected platform.
const PLATFORM_CATEGORIES: &[&str] = &["linux", "macos"];

/// Resolve a profile by name: compute the active and excluded categories,
/// applying platform auto-detection.
///
/// Profiles come from `<conf_dir>/profiles.toml` when present, otherwise
/// from the built-in `interactive` and `headless` definitions.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownProfile`] if the profile is not defined, or
/// an error if `profiles.toml` cannot be parsed.
pub fn resolve(name: &str, conf_dir: &Path, platform: &Platform) -> Result<Profile> {
    let defs: toml::map::Map<String, toml::Value> =
        load_config_or(&conf_dir.join("profiles.toml"), DEFAULT_PROFILES)?;

    let Some(value) = defs.get(name) else {
        let mut available: Vec<&str> = defs.keys().map(String::as_str).collect();
        available.sort_unstable();
        return Err(ConfigError::UnknownProfile {
            name: name.to_string(),
            available: available.join(", "),
        }
        .into());
    };
    let def: ProfileDef = value.clone().try_into().map_err(|e: toml::de::Error| {
        ConfigError::Parse {
            path: conf_dir.join("profiles.toml"),
            message: format!("[{name}]: {}", e.message()),
        }
    })?;

    let mut active: Vec<String> = vec!["base".to_string()];
    active.extend(def.include.iter().map(|c| c.to_lowercase()));

    let mut excluded: Vec<String> = def.exclude.iter().map(|c| c.to_lowercase()).collect();

    for category in PLATFORM_CATEGORIES {
        if platform.excludes_category(category) {
            excluded.push((*category).to_string());
        } else {
            active.push((*category).to_string());
        }
    }

    active.retain(|c| !excluded.contains(c));

    active.sort();
    active.dedup();
    excluded.sort();
    excluded.dedup();

    Ok(Profile {
        name: name.to_string(),
        active_categories: active,
        excluded_categories: excluded,
    })
}
