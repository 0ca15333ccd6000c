// src/engine/mod.rs

//! Re-run engine for watch mode.
//!
//! After the initial series, file changes arrive as [`RuntimeEvent`]s. The
//! engine turns them into task runs:
//! - each [`TaskKind`] runs at most once at a time;
//! - a trigger for a running task is coalesced into a single pending re-run;
//! - different task kinds run concurrently.
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`], and task execution is delegated to a
//! [`TaskBackend`].

use crate::pipeline::TaskKind;

/// Outcome of a task run as seen by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Every file was processed.
    Success,
    /// The run completed, but this many files were skipped.
    FilesFailed(usize),
    /// The task itself failed (e.g. its input directory is gone).
    Failed,
}

/// Why a task was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Manual trigger (e.g. from a test or the initial series).
    Manual,
    /// Triggered due to a filesystem event.
    FileWatch,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// If true, exit the runtime once every task is idle with nothing
    /// pending.
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from watchers, backends, etc.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A task should be (re-)run.
    TaskTriggered {
        task: TaskKind,
        reason: TriggerReason,
    },
    /// A task run finished.
    TaskCompleted {
        task: TaskKind,
        outcome: TaskOutcome,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod backend;
pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use backend::{BlockingTaskBackend, TaskBackend};
pub use core::{CoreRuntime, TaskState};
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Runtime;
