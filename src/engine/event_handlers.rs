// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use tracing::{debug, info, warn};

use crate::engine::core::TaskState;
use crate::engine::{TaskOutcome, TriggerReason};
use crate::pipeline::TaskKind;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreCommand {
    /// Run this task on the backend.
    Dispatch(TaskKind),
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn continue_with(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Handle a task trigger event.
///
/// - Idle: dispatch now.
/// - Running: remember that another run is wanted. Any number of triggers
///   while running collapse into one re-run.
pub fn handle_task_trigger(
    state: &mut TaskState,
    task: TaskKind,
    reason: TriggerReason,
) -> CoreStep {
    match *state {
        TaskState::Idle => {
            debug!(%task, ?reason, "dispatching task");
            *state = TaskState::Running;
            CoreStep::continue_with(vec![CoreCommand::Dispatch(task)])
        }
        TaskState::Running | TaskState::RunningWithPending => {
            debug!(%task, ?reason, "task already running; re-run queued");
            *state = TaskState::RunningWithPending;
            CoreStep::continue_with(Vec::new())
        }
    }
}

/// Handle a task completion event.
pub fn handle_task_completion(
    state: &mut TaskState,
    task: TaskKind,
    outcome: TaskOutcome,
) -> CoreStep {
    match outcome {
        TaskOutcome::Success => info!(%task, "rebuilt"),
        TaskOutcome::FilesFailed(n) => warn!(%task, failed = n, "rebuilt with skipped files"),
        TaskOutcome::Failed => warn!(%task, "rebuild failed; waiting for next change"),
    }

    match *state {
        TaskState::RunningWithPending => {
            *state = TaskState::Running;
            CoreStep::continue_with(vec![CoreCommand::Dispatch(task)])
        }
        TaskState::Running | TaskState::Idle => {
            *state = TaskState::Idle;
            CoreStep::continue_with(Vec::new())
        }
    }
}
