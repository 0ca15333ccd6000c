// src/watch/hash.rs

use std::path::Path;

use anyhow::{Context, Result};
use blake3::Hasher;

use crate::fs::FileSystem;

/// Compute the hash of a single file.
pub fn compute_file_hash(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let mut reader = fs
        .open_read(path)
        .with_context(|| format!("opening file for hashing: {:?}", path))?;
    let mut hasher = Hasher::new();
    std::io::copy(&mut reader, &mut hasher)
        .with_context(|| format!("hashing file {:?}", path))?;
    Ok(hasher.finalize().to_hex().to_string())
}
