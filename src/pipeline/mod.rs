// src/pipeline/mod.rs

//! Asset transforms.
//!
//! Each transform is a type implementing [`AssetTask`]. A task expands its
//! source globs, pushes every file through its stages, and writes into the
//! output directory selected by the active mode.
//!
//! - [`template`] renders pages against the views directory.
//! - [`style`] compiles the style-sheet entry point.
//! - [`script`] minifies (optionally) and concatenates scripts.
//! - [`image`] optimizes (optionally) images.
//! - [`sources`] expands globs into ordered file lists.
//!
//! Per-file failures are isolated: they are logged, recorded in the
//! [`TaskReport`], and the remaining files are still processed. Only a
//! missing input directory (or a failure that makes the whole task
//! meaningless) is returned as an error.

pub mod image;
pub mod script;
pub mod sources;
pub mod style;
pub mod template;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::config::BuildConfig;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::types::AssetClass;

pub use image::ImageTask;
pub use script::ScriptTask;
pub use sources::{collect_sources, SourceFile};
pub use style::StyleTask;
pub use template::TemplateTask;

/// Typed name of a transform task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKind {
    Templates,
    Styles,
    Scripts,
    Images,
}

impl TaskKind {
    /// The transforms in the order entry points run them.
    pub const SERIES: [TaskKind; 4] = [
        TaskKind::Templates,
        TaskKind::Styles,
        TaskKind::Scripts,
        TaskKind::Images,
    ];

    /// Asset class this task writes.
    pub fn asset_class(self) -> AssetClass {
        match self {
            TaskKind::Templates => AssetClass::Html,
            TaskKind::Styles => AssetClass::Styles,
            TaskKind::Scripts => AssetClass::Scripts,
            TaskKind::Images => AssetClass::Images,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TaskKind::Templates => "templates",
            TaskKind::Styles => "styles",
            TaskKind::Scripts => "scripts",
            TaskKind::Images => "images",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A file that failed inside a task without stopping it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of a single task run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub kind: TaskKind,
    pub written: Vec<PathBuf>,
    pub failed: Vec<FileFailure>,
}

impl TaskReport {
    pub fn new(kind: TaskKind) -> Self {
        Self {
            kind,
            written: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Run `stage` for one file; an error is logged and recorded instead of
    /// aborting the task.
    pub fn isolate<T>(
        &mut self,
        path: &Path,
        stage: impl FnOnce() -> Result<T>,
    ) -> Option<T> {
        match stage() {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(
                    task = %self.kind,
                    file = ?path,
                    error = %err,
                    "file failed; continuing with remaining files"
                );
                self.failed.push(FileFailure {
                    path: path.to_path_buf(),
                    message: err.to_string(),
                });
                None
            }
        }
    }
}

/// Everything a task needs: the immutable build configuration and the
/// filesystem to read from and write to.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub config: Arc<BuildConfig>,
    pub fs: Arc<dyn FileSystem>,
}

impl TaskContext {
    pub fn new(config: Arc<BuildConfig>, fs: Arc<dyn FileSystem>) -> Self {
        Self { config, fs }
    }

    /// Write one output file, replacing whatever is there.
    pub fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.fs.write(path, contents)?;
        Ok(())
    }
}

/// A transform task.
pub trait AssetTask: Send + Sync {
    fn kind(&self) -> TaskKind;

    /// Run the task once over its current inputs.
    fn run(&self, ctx: &TaskContext) -> Result<TaskReport>;
}

/// The task implementation for `kind`.
pub fn task_for(kind: TaskKind) -> Box<dyn AssetTask> {
    match kind {
        TaskKind::Templates => Box::new(TemplateTask),
        TaskKind::Styles => Box::new(StyleTask),
        TaskKind::Scripts => Box::new(ScriptTask),
        TaskKind::Images => Box::new(ImageTask),
    }
}

/// Run one task with start/finish logging.
pub fn run_task(kind: TaskKind, ctx: &TaskContext) -> Result<TaskReport> {
    let started = Instant::now();
    info!(task = %kind, mode = %ctx.config.mode(), "starting task");

    let report = task_for(kind).run(ctx)?;

    info!(
        task = %kind,
        written = report.written.len(),
        failed = report.failed.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "finished task"
    );
    Ok(report)
}

/// Run tasks one after another; the first task error stops the series.
pub fn run_series(kinds: &[TaskKind], ctx: &TaskContext) -> Result<Vec<TaskReport>> {
    let mut reports = Vec::with_capacity(kinds.len());
    for kind in kinds {
        reports.push(run_task(*kind, ctx)?);
    }
    Ok(reports)
}
