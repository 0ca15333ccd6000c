// src/watch/event_handler.rs

//! Event processing logic for file system changes.

use std::path::Path;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::fs::FileSystem;
use crate::pipeline::TaskKind;
use crate::watch::cache::FileCache;
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::{tasks_for_path, TaskWatchProfile};

/// Process a single changed path and trigger the tasks watching it.
///
/// 1. Relativize the path against the project root.
/// 2. Find every profile matching it.
/// 3. Drop the event if the file still exists with the same content hash as
///    last time. Removals always go through.
/// 4. Send one trigger per matching task.
///
/// Returns the triggered tasks. An empty result with a closed runtime
/// channel means the caller can stop.
pub async fn process_file_change(
    fs: &dyn FileSystem,
    root: &Path,
    path: &Path,
    profiles: &[TaskWatchProfile],
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
    file_cache: &mut FileCache,
) -> Vec<TaskKind> {
    let Some(rel_str) = relative_str(root, path) else {
        warn!("could not relativize path {:?} against root {:?}", path, root);
        return Vec::new();
    };

    let tasks = tasks_for_path(profiles, &rel_str);
    if tasks.is_empty() {
        return tasks;
    }

    if fs.is_file(path) {
        match file_cache.refresh(fs, path) {
            Ok(true) => {}
            Ok(false) => {
                debug!(rel = %rel_str, "content unchanged; ignoring event");
                return Vec::new();
            }
            Err(err) => {
                warn!(rel = %rel_str, error = %err, "failed to hash file; triggering anyway");
            }
        }
    } else if fs.is_dir(path) {
        return Vec::new();
    } else {
        file_cache.invalidate(path);
    }

    for task in &tasks {
        debug!(%task, path = %rel_str, "watch match -> triggering task");
        if let Err(err) = runtime_tx
            .send(RuntimeEvent::TaskTriggered {
                task: *task,
                reason: TriggerReason::FileWatch,
            })
            .await
        {
            warn!("failed to send RuntimeEvent::TaskTriggered: {err}");
            return Vec::new();
        }
    }

    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathTable;
    use crate::fs::mock::MockFileSystem;
    use crate::watch::patterns::build_task_watch_profiles;

    struct Harness {
        fs: MockFileSystem,
        profiles: Vec<TaskWatchProfile>,
        cache: FileCache,
        tx: mpsc::Sender<RuntimeEvent>,
        rx: mpsc::Receiver<RuntimeEvent>,
    }

    impl Harness {
        fn new() -> Self {
            let (tx, rx) = mpsc::channel(16);
            Self {
                fs: MockFileSystem::new(),
                profiles: build_task_watch_profiles(&PathTable::default()).unwrap(),
                cache: FileCache::new(),
                tx,
                rx,
            }
        }

        async fn change(&mut self, path: &str) -> Vec<TaskKind> {
            process_file_change(
                &self.fs,
                Path::new("/site"),
                Path::new(path),
                &self.profiles,
                &self.tx,
                &mut self.cache,
            )
            .await
        }

        fn drain(&mut self) -> Vec<TaskKind> {
            let mut out = Vec::new();
            while let Ok(event) = self.rx.try_recv() {
                if let RuntimeEvent::TaskTriggered { task, reason } = event {
                    assert_eq!(reason, TriggerReason::FileWatch);
                    out.push(task);
                }
            }
            out
        }
    }

    #[tokio::test]
    async fn style_change_triggers_only_styles() {
        let mut h = Harness::new();
        h.fs.add_file("/site/app/scss/main.scss", "a { color: red; }");

        h.change("/site/app/scss/main.scss").await;

        assert_eq!(h.drain(), vec![TaskKind::Styles]);
    }

    #[tokio::test]
    async fn duplicate_events_for_same_content_are_suppressed() {
        let mut h = Harness::new();
        h.fs.add_file("/site/app/js/a.js", "let a = 1;");

        h.change("/site/app/js/a.js").await;
        h.change("/site/app/js/a.js").await;
        assert_eq!(h.drain(), vec![TaskKind::Scripts]);

        h.fs.add_file("/site/app/js/a.js", "let a = 2;");
        h.change("/site/app/js/a.js").await;
        assert_eq!(h.drain(), vec![TaskKind::Scripts]);
    }

    #[tokio::test]
    async fn removal_always_triggers() {
        let mut h = Harness::new();
        h.fs.add_file("/site/app/views/layout.njk", "x");
        h.change("/site/app/views/layout.njk").await;
        h.drain();

        h.fs.remove_file("/site/app/views/layout.njk");
        let triggered = h.change("/site/app/views/layout.njk").await;

        assert_eq!(triggered, vec![TaskKind::Templates]);
        assert_eq!(h.drain(), vec![TaskKind::Templates]);
    }

    #[tokio::test]
    async fn output_and_foreign_paths_are_ignored() {
        let mut h = Harness::new();
        h.fs.add_file("/site/build/css/main.css", "a{}");

        h.change("/site/build/css/main.css").await;
        h.change("/tmp/elsewhere.js").await;

        assert!(h.drain().is_empty());
    }
}
