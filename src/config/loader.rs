// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::PathTable;
use crate::config::validate::validate_table;
use crate::errors::{Result, SitepipeError};

/// File name looked up in the project root when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "Sitepipe.toml";

/// Read and deserialize a path table from `path`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for
/// the checked entry point.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<PathTable> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let table: PathTable = toml::from_str(&contents)?;

    Ok(table)
}

/// Resolve the path table for a project.
///
/// - An explicit path must exist.
/// - Otherwise `<root>/Sitepipe.toml` is used when present.
/// - Otherwise the built-in table is used.
///
/// The result is validated either way.
pub fn load_and_validate(root: &Path, explicit: Option<&Path>) -> Result<PathTable> {
    let table = match explicit {
        Some(path) => {
            let path = resolve_against(root, path);
            if !path.is_file() {
                return Err(SitepipeError::ConfigError(format!(
                    "config file {:?} does not exist",
                    path
                )));
            }
            debug!(?path, "loading path table");
            load_from_path(&path)?
        }
        None => {
            let candidate = root.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                debug!(path = ?candidate, "loading path table");
                load_from_path(&candidate)?
            } else {
                debug!("no {CONFIG_FILE_NAME} found; using built-in path table");
                PathTable::default()
            }
        }
    };

    validate_table(&table)?;
    Ok(table)
}

fn resolve_against(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
