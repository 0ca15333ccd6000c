use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use sitepipe::engine::{RuntimeEvent, TaskBackend, TaskOutcome};
use sitepipe::errors::Result;
use sitepipe::pipeline::TaskKind;
use tokio::sync::mpsc;

/// A fake backend that:
/// - records which tasks were dispatched
/// - immediately reports TaskCompleted(Success) for each of them.
pub struct FakeBackend {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    dispatched: Arc<Mutex<Vec<TaskKind>>>,
}

impl FakeBackend {
    pub fn new(
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        dispatched: Arc<Mutex<Vec<TaskKind>>>,
    ) -> Self {
        Self {
            runtime_tx,
            dispatched,
        }
    }
}

impl TaskBackend for FakeBackend {
    fn dispatch(&mut self, task: TaskKind) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let dispatched = Arc::clone(&self.dispatched);

        Box::pin(async move {
            dispatched.lock().unwrap().push(task);

            tx.send(RuntimeEvent::TaskCompleted {
                task,
                outcome: TaskOutcome::Success,
            })
            .await
            .map_err(anyhow::Error::from)?;
            Ok(())
        })
    }
}
