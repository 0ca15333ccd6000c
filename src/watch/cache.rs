// src/watch/cache.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::fs::FileSystem;
use crate::watch::hash::compute_file_hash;

/// Last seen content hash per watched file.
///
/// Editors and platforms often report one save as several events; only the
/// first one with new content should re-run a task.
#[derive(Debug, Default)]
pub struct FileCache {
    hashes: HashMap<PathBuf, String>,
}

impl FileCache {
    pub fn new() -> Self {
        Self {
            hashes: HashMap::new(),
        }
    }

    /// Re-hash `path` and report whether its content differs from the last
    /// time it was seen. A file seen for the first time counts as changed.
    pub fn refresh(&mut self, fs: &dyn FileSystem, path: &Path) -> Result<bool> {
        let hash = compute_file_hash(fs, path)?;
        match self.hashes.insert(path.to_path_buf(), hash.clone()) {
            Some(old) if old == hash => {
                debug!("content unchanged for {:?}", path);
                Ok(false)
            }
            _ => Ok(true),
        }
    }

    /// Drop the entry for a removed file.
    pub fn invalidate(&mut self, path: &Path) {
        if self.hashes.remove(path).is_some() {
            debug!("invalidated cache for {:?}", path);
        }
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn reports_only_real_changes() {
        let fs = MockFileSystem::new();
        let path = Path::new("/site/app/scss/main.scss");
        fs.add_file(path, "a {}");

        let mut cache = FileCache::new();
        assert!(cache.refresh(&fs, path).unwrap());
        assert!(!cache.refresh(&fs, path).unwrap());

        fs.add_file(path, "b {}");
        assert!(cache.refresh(&fs, path).unwrap());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_forgets_file() {
        let fs = MockFileSystem::new();
        let path = Path::new("/site/a.js");
        fs.add_file(path, "1");

        let mut cache = FileCache::new();
        cache.refresh(&fs, path).unwrap();
        cache.invalidate(path);

        assert!(cache.is_empty());
        assert!(cache.refresh(&fs, path).unwrap());
    }
}
