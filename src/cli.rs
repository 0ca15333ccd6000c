// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::plan::EntryPoint;

/// Command-line arguments for `sitepipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sitepipe",
    version,
    about = "Build a static front-end project and serve it with live reload.",
    long_about = None
)]
pub struct CliArgs {
    /// Entry point to run.
    #[arg(value_enum, default_value_t = EntryPoint::Default)]
    pub task: EntryPoint,

    /// Build mode (`development` or `production`).
    ///
    /// Any other value falls back to development with a warning.
    #[arg(long, value_name = "MODE")]
    pub mode: Option<String>,

    /// Project root; every path in the path table is relative to it.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Path table overrides (TOML).
    ///
    /// Default: `Sitepipe.toml` in the project root, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SITEPIPE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve mode, path table and plan, print them, and exit.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_default_entry_and_cwd() {
        let args = CliArgs::try_parse_from(["sitepipe"]).unwrap();
        assert_eq!(args.task, EntryPoint::Default);
        assert_eq!(args.mode, None);
        assert_eq!(args.root, PathBuf::from("."));
        assert!(!args.dry_run);
    }

    #[test]
    fn parses_build_with_mode() {
        let args =
            CliArgs::try_parse_from(["sitepipe", "build", "--mode", "production", "--dry-run"])
                .unwrap();
        assert_eq!(args.task, EntryPoint::Build);
        assert_eq!(args.mode.as_deref(), Some("production"));
        assert!(args.dry_run);
    }

    #[test]
    fn unknown_mode_is_accepted_for_later_fallback() {
        let args = CliArgs::try_parse_from(["sitepipe", "--mode", "staging"]).unwrap();
        assert_eq!(args.mode.as_deref(), Some("staging"));
    }

    #[test]
    fn unknown_entry_point_is_rejected() {
        assert!(CliArgs::try_parse_from(["sitepipe", "deploy"]).is_err());
    }
}
