// src/watch/path_utils.rs

use std::path::Path;

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// A direct `strip_prefix` is tried first; if that fails (symlinked roots,
/// `/private/var` on macOS) both sides are canonicalized and tried again.
/// Removed files cannot be canonicalized, so for those only the direct
/// form works.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_string_lossy().replace('\\', "/"));
    }

    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return Some(rel.to_string_lossy().replace('\\', "/"));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_root_prefix() {
        assert_eq!(
            relative_str(Path::new("/site"), Path::new("/site/app/js/a.js")).as_deref(),
            Some("app/js/a.js")
        );
    }

    #[test]
    fn unrelated_path_is_none() {
        assert_eq!(relative_str(Path::new("/site"), Path::new("/elsewhere/a.js")), None);
    }
}
