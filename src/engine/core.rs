// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated per-task state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The core is intended to be unit tested without any Tokio, channels,
//! filesystem, or tasks.

use std::collections::BTreeMap;

use crate::engine::event_handlers::{handle_task_completion, handle_task_trigger, CoreStep};
use crate::engine::{RuntimeEvent, RuntimeOptions};
use crate::pipeline::TaskKind;

/// Run state of a single task kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskState {
    #[default]
    Idle,
    Running,
    /// Running, and at least one trigger arrived since it started.
    RunningWithPending,
}

/// Pure core runtime state.
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug, Default)]
pub struct CoreRuntime {
    states: BTreeMap<TaskKind, TaskState>,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(options: RuntimeOptions) -> Self {
        let states = TaskKind::SERIES
            .iter()
            .map(|kind| (*kind, TaskState::Idle))
            .collect();
        Self { states, options }
    }

    pub fn state_of(&self, task: TaskKind) -> TaskState {
        self.states.get(&task).copied().unwrap_or_default()
    }

    /// True when no task is running or pending.
    pub fn is_idle(&self) -> bool {
        self.states.values().all(|s| *s == TaskState::Idle)
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::TaskTriggered { task, reason } => {
                handle_task_trigger(self.states.entry(task).or_default(), task, reason)
            }
            RuntimeEvent::TaskCompleted { task, outcome } => {
                let mut step =
                    handle_task_completion(self.states.entry(task).or_default(), task, outcome);
                if self.options.exit_when_idle && self.is_idle() {
                    step.keep_running = false;
                }
                step
            }
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}
