// src/engine/backend.rs

//! Pluggable task backend abstraction.
//!
//! The runtime talks to a `TaskBackend` instead of running tasks itself.
//! This makes it easy to swap in a fake backend in tests.
//!
//! - `BlockingTaskBackend` is the implementation used by `sitepipe`. Each
//!   dispatched task runs on Tokio's blocking pool and reports back with a
//!   `TaskCompleted` event.
//! - Tests can provide their own `TaskBackend` that, for example, records
//!   which tasks were dispatched and directly emits `TaskCompleted` events.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;
use tracing::{error, warn};

use crate::engine::{RuntimeEvent, TaskOutcome};
use crate::errors::Result;
use crate::pipeline::{run_task, TaskContext, TaskKind};

/// Trait abstracting how dispatched tasks are executed.
pub trait TaskBackend: Send {
    /// Start running `task`. Completion is reported asynchronously through
    /// a `RuntimeEvent::TaskCompleted`.
    fn dispatch(&mut self, task: TaskKind) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Runs tasks on `spawn_blocking` threads.
pub struct BlockingTaskBackend {
    ctx: TaskContext,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl BlockingTaskBackend {
    pub fn new(ctx: TaskContext, runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self { ctx, runtime_tx }
    }
}

impl TaskBackend for BlockingTaskBackend {
    fn dispatch(&mut self, task: TaskKind) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let ctx = self.ctx.clone();
        let tx = self.runtime_tx.clone();

        Box::pin(async move {
            tokio::spawn(async move {
                let joined = tokio::task::spawn_blocking(move || run_task(task, &ctx)).await;
                let outcome = match joined {
                    Ok(Ok(report)) if report.is_clean() => TaskOutcome::Success,
                    Ok(Ok(report)) => TaskOutcome::FilesFailed(report.failed.len()),
                    Ok(Err(err)) => {
                        error!(%task, error = %err, "task failed");
                        TaskOutcome::Failed
                    }
                    Err(err) => {
                        error!(%task, error = %err, "task panicked");
                        TaskOutcome::Failed
                    }
                };

                if tx
                    .send(RuntimeEvent::TaskCompleted { task, outcome })
                    .await
                    .is_err()
                {
                    warn!(%task, "runtime gone; dropping completion");
                }
            });
            Ok(())
        })
    }
}
