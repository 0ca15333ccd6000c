// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SitepipeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Input path does not exist: {0:?}")]
    MissingInput(PathBuf),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Style compilation error: {0}")]
    Style(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Live-reload server error: {0}")]
    Serve(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<tera::Error> for SitepipeError {
    fn from(err: tera::Error) -> Self {
        // tera nests the useful message (line/column) in the source chain.
        let mut msg = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(inner) = source {
            msg.push_str(": ");
            msg.push_str(&inner.to_string());
            source = inner.source();
        }
        SitepipeError::Template(msg)
    }
}

impl From<globset::Error> for SitepipeError {
    fn from(err: globset::Error) -> Self {
        SitepipeError::ConfigError(err.to_string())
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SitepipeError>;
