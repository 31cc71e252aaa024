//! TOML configuration file parsing with category filtering.
use anyhow::Result;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use super::category_matcher::{matches, parse_section};
use crate::error::ConfigError;

/// Deserialize `path`, falling back to `default` when the file is absent.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file exists but cannot be read, and
/// [`ConfigError::Parse`] if either source is not valid for `T`.
pub fn load_config_or<T: DeserializeOwned>(path: &Path, default: &str) -> Result<T> {
    if !path.exists() {
        return toml::from_str(default).map_err(|e| {
            ConfigError::Parse {
                path: PathBuf::from("<built-in>"),
                message: e.message().to_string(),
            }
            .into()
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|e| {
        ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        }
        .into()
    })
}

/// Load a TOML file whose top-level tables are category sections, and return
/// `(section_name, items)` pairs in document order.
///
/// `extract` receives the deserialized section and returns the items stored
/// inside it (e.g. `|s: PackageSection| s.packages`).
///
/// # Errors
///
/// Returns an error if the file cannot be read or a section has the wrong shape.
pub fn load_section_items<S, T>(
    path: &Path,
    default: &str,
    extract: impl Fn(S) -> Vec<T>,
) -> Result<Vec<(String, Vec<T>)>>
where
    S: DeserializeOwned,
{
    let table: toml::Table = load_config_or(path, default)?;
    table
        .into_iter()
        .map(|(name, value)| -> Result<(String, Vec<T>)> {
            let section: S = value.try_into().map_err(|e: toml::de::Error| {
                ConfigError::Parse {
                    path: path.to_path_buf(),
                    message: format!("[{name}]: {}", e.message()),
                }
            })?;
            Ok((name, extract(section)))
        })
        .collect()
}

/// Keep the items of every section whose categories match `active_categories`.
#[must_use]
pub fn filter_by_categories<T>(
    items: Vec<(String, Vec<T>)>,
    active_categories: &[String],
) -> Vec<T> {
    items
        .into_iter()
        .filter(|(section_name, _)| {
            matches(&parse_section(section_name), active_categories)
        })
        .flat_map(|(_, items)| items)
        .collect()
}
