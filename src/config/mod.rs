// src/config/mod.rs

//! Path table and build configuration.
//!
//! Responsibilities:
//! - Define the TOML-backed path table and the resolved `BuildConfig`
//!   (`model.rs`).
//! - Load an optional `Sitepipe.toml` from disk (`loader.rs`).
//! - Validate globs and output layout (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, CONFIG_FILE_NAME};
pub use model::{
    BuildConfig, ImageOptions, OutputGroup, PathTable, ServeGroup, SourceGroup, StageOptions,
    ViewsGroup,
};
pub use validate::validate_table;
