// src/config/validate.rs

use std::collections::HashSet;

use crate::config::model::{OutputGroup, PathTable};
use crate::errors::{Result, SitepipeError};
use crate::pipeline::sources::compile_glob;
use crate::types::{AssetClass, Mode};

/// Run semantic validation against a path table.
///
/// This checks:
/// - every source, view and serve glob compiles
/// - each asset class has at least one source pattern
/// - within a group, no two asset classes share an output directory
/// - the production and development groups do not share a directory
pub fn validate_table(table: &PathTable) -> Result<()> {
    validate_globs(table)?;
    validate_sources(table)?;
    validate_output_group(Mode::Production, &table.production)?;
    validate_output_group(Mode::Development, &table.development)?;
    validate_disjoint_modes(table)?;
    Ok(())
}

fn validate_globs(table: &PathTable) -> Result<()> {
    let all = AssetClass::ALL
        .iter()
        .flat_map(|class| table.source.patterns(*class).iter())
        .chain(std::iter::once(&table.views.source))
        .chain(table.serve.path_list.iter());

    for pattern in all {
        // Same builder the tasks and watchers match with.
        compile_glob(pattern).map_err(|e| {
            SitepipeError::ConfigError(format!("invalid glob pattern {pattern:?}: {e}"))
        })?;
    }
    Ok(())
}

fn validate_sources(table: &PathTable) -> Result<()> {
    for class in AssetClass::ALL {
        if table.source.patterns(class).is_empty() {
            return Err(SitepipeError::ConfigError(format!(
                "[source].{class} must list at least one pattern"
            )));
        }
    }
    Ok(())
}

fn normalize(dir: &str) -> String {
    let trimmed = dir.trim_start_matches("./").trim_end_matches('/');
    if trimmed.is_empty() {
        ".".to_string()
    } else {
        trimmed.to_string()
    }
}

fn validate_output_group(mode: Mode, group: &OutputGroup) -> Result<()> {
    let mut seen = HashSet::new();
    for class in AssetClass::ALL {
        let dir = normalize(group.dir(class));
        if !seen.insert(dir.clone()) {
            return Err(SitepipeError::ConfigError(format!(
                "[{mode}].{class} reuses output directory {dir:?}"
            )));
        }
    }
    Ok(())
}

fn validate_disjoint_modes(table: &PathTable) -> Result<()> {
    let production: HashSet<String> = AssetClass::ALL
        .iter()
        .map(|c| normalize(table.production.dir(*c)))
        .collect();

    for class in AssetClass::ALL {
        let dir = normalize(table.development.dir(class));
        if production.contains(&dir) {
            return Err(SitepipeError::ConfigError(format!(
                "[development].{class} and [production] both write to {dir:?}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_valid() {
        validate_table(&PathTable::default()).unwrap();
    }

    #[test]
    fn rejects_bad_glob() {
        let mut table = PathTable::default();
        table.source.scripts = vec!["app/js/[.js".to_string()];
        let err = validate_table(&table).unwrap_err();
        assert!(matches!(err, SitepipeError::ConfigError(msg) if msg.contains("app/js/[.js")));
    }

    #[test]
    fn accepts_dot_slash_prefixed_globs() {
        let mut table = PathTable::default();
        table.source.scripts = vec!["./app/js/**/*.js".to_string()];
        table.serve.path_list = vec!["./build/**/*.html".to_string()];
        validate_table(&table).unwrap();
    }

    #[test]
    fn rejects_shared_output_dir_within_group() {
        let mut table = PathTable::default();
        table.development.scripts = "build/css/".to_string();
        let err = validate_table(&table).unwrap_err();
        assert!(matches!(err, SitepipeError::ConfigError(msg) if msg.contains("reuses")));
    }

    #[test]
    fn rejects_overlapping_modes() {
        let mut table = PathTable::default();
        table.development = OutputGroup::production();
        assert!(validate_table(&table).is_err());
    }
}
