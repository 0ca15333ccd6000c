// src/pipeline/sources.rs

//! Input enumeration: expand source globs into an ordered file list.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;

use crate::errors::{Result, SitepipeError};
use crate::fs::FileSystem;

/// A file matched by a source glob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path on disk.
    pub path: PathBuf,
    /// Path relative to the glob base, with forward slashes. This is the
    /// part that is mirrored under the output directory.
    pub relative: String,
}

/// One compiled source pattern plus its literal base directory.
#[derive(Debug, Clone)]
pub struct SourcePattern {
    pattern: String,
    base: String,
    matcher: GlobMatcher,
}

impl SourcePattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let matcher = compile_glob(pattern)?.compile_matcher();
        Ok(Self {
            pattern: pattern.to_string(),
            base: glob_base(pattern),
            matcher,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Literal directory prefix of the pattern, relative to the project root.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn is_match(&self, rel_path: &str) -> bool {
        self.matcher.is_match(rel_path)
    }
}

/// Build a glob where `*` does not cross directory separators, so that
/// `app/*.html` matches only top-level pages while `**` still recurses.
pub fn compile_glob(pattern: &str) -> Result<globset::Glob> {
    let pattern = pattern.trim_start_matches("./");
    Ok(GlobBuilder::new(pattern).literal_separator(true).build()?)
}

/// Directory part of a glob before the first component containing a glob
/// metacharacter. For a literal file path this is its parent directory.
///
/// `app/js/**/*.js` -> `app/js`, `app/*.html` -> `app`,
/// `app/scss/main.scss` -> `app/scss`.
pub fn glob_base(pattern: &str) -> String {
    let pattern = pattern.trim_start_matches("./");
    let components: Vec<&str> = pattern.split('/').collect();
    let first_magic = components
        .iter()
        .position(|c| c.contains(['*', '?', '[', '{']));

    let literal = match first_magic {
        Some(idx) => &components[..idx],
        // Literal file path: everything but the file name.
        None => &components[..components.len().saturating_sub(1)],
    };

    literal
        .iter()
        .filter(|c| !c.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/")
}

/// Expand `patterns` (relative to `root`) into a de-duplicated file list.
///
/// Ordering: patterns in the order given; within a pattern, files sorted by
/// relative path. A pattern whose base directory does not exist is an error.
pub fn collect_sources(
    fs: &dyn FileSystem,
    root: &Path,
    patterns: &[String],
) -> Result<Vec<SourceFile>> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut out = Vec::new();

    for raw in patterns {
        let pattern = SourcePattern::new(raw)?;
        let base_dir = if pattern.base().is_empty() {
            root.to_path_buf()
        } else {
            root.join(pattern.base())
        };

        if !fs.is_dir(&base_dir) {
            return Err(SitepipeError::MissingInput(base_dir));
        }

        let mut matched = Vec::new();
        walk_files(fs, &base_dir, &mut |path| {
            if let Some(rel) = relative_to(root, path) {
                if pattern.is_match(&rel) {
                    matched.push(path.to_path_buf());
                }
            }
        })?;
        matched.sort();

        debug!(pattern = %raw, count = matched.len(), "expanded source glob");

        for path in matched {
            if !seen.insert(path.clone()) {
                continue;
            }
            let relative = relative_to(&base_dir, &path).unwrap_or_default();
            out.push(SourceFile { path, relative });
        }
    }

    Ok(out)
}

fn walk_files(
    fs: &dyn FileSystem,
    dir: &Path,
    visit: &mut dyn FnMut(&Path),
) -> Result<()> {
    let mut stack = vec![dir.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                stack.push(path);
            } else if fs.is_file(&path) {
                visit(&path);
            }
        }
    }

    Ok(())
}

/// Path of `path` relative to `base` with forward slashes.
pub fn relative_to(base: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(base)
        .ok()
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn glob_base_examples() {
        assert_eq!(glob_base("app/js/**/*.js"), "app/js");
        assert_eq!(glob_base("app/*.html"), "app");
        assert_eq!(glob_base("app/scss/main.scss"), "app/scss");
        assert_eq!(glob_base("app/images/**/*.{jpg,png,gif}"), "app/images");
        assert_eq!(glob_base("./build/**/*"), "build");
        assert_eq!(glob_base("*.html"), "");
    }

    #[test]
    fn single_star_does_not_cross_directories() {
        let p = SourcePattern::new("app/*.html").unwrap();
        assert!(p.is_match("app/index.html"));
        assert!(!p.is_match("app/views/index.html"));
    }

    #[test]
    fn collects_sorted_with_relative_paths() {
        let fs = MockFileSystem::new();
        let root = PathBuf::from("/site");
        fs.add_file("/site/app/js/b.js", "b");
        fs.add_file("/site/app/js/a.js", "a");
        fs.add_file("/site/app/js/lib/c.js", "c");
        fs.add_file("/site/app/js/notes.txt", "x");

        let files = collect_sources(&fs, &root, &["app/js/**/*.js".to_string()]).unwrap();
        let rels: Vec<&str> = files.iter().map(|f| f.relative.as_str()).collect();
        assert_eq!(rels, vec!["a.js", "b.js", "lib/c.js"]);
    }

    #[test]
    fn missing_base_dir_is_fatal() {
        let fs = MockFileSystem::new();
        fs.add_dir("/site");
        let err = collect_sources(&fs, Path::new("/site"), &["app/js/**/*.js".to_string()])
            .unwrap_err();
        assert!(matches!(err, SitepipeError::MissingInput(p) if p.ends_with("app/js")));
    }

    #[test]
    fn overlapping_patterns_do_not_duplicate() {
        let fs = MockFileSystem::new();
        fs.add_file("/site/app/index.html", "<p></p>");
        let files = collect_sources(
            &fs,
            Path::new("/site"),
            &["app/*.html".to_string(), "app/index.html".to_string()],
        )
        .unwrap();
        assert_eq!(files.len(), 1);
    }
}
