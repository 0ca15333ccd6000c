// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::RuntimeEvent;
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::cache::FileCache;
use crate::watch::event_handler::process_file_change;
use crate::watch::patterns::TaskWatchProfile;

/// Handle for a filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

impl WatcherHandle {
    pub(crate) fn new(inner: RecommendedWatcher) -> Self {
        Self { _inner: inner }
    }
}

/// Start a `notify` watcher on `dir` that forwards raw events into an
/// unbounded channel. Access events are dropped.
pub(crate) fn forward_notify_events(
    dir: &std::path::Path,
) -> Result<(RecommendedWatcher, mpsc::UnboundedReceiver<Event>)> {
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    // Called synchronously by notify whenever an event arrives.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Access(_)) {
                    return;
                }
                if let Err(err) = event_tx.send(event) {
                    warn!("failed to forward notify event: {err}");
                }
            }
            Err(err) => warn!("file watch error: {err}"),
        },
        Config::default(),
    )?;

    watcher.watch(dir, RecursiveMode::Recursive)?;
    Ok((watcher, event_rx))
}

/// Spawn a filesystem watcher that observes `root` recursively and sends
/// `RuntimeEvent::TaskTriggered` for each task whose profile matches a
/// changed path.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    profiles: Vec<TaskWatchProfile>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    // Canonicalize once so we have a stable base path.
    let root = root.canonicalize().unwrap_or(root);

    let (watcher, mut event_rx) = forward_notify_events(&root)?;
    info!("watching sources under {:?}", root);

    let profiles = Arc::new(profiles);
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    tokio::spawn(async move {
        let mut file_cache = FileCache::new();

        while let Some(event) = event_rx.recv().await {
            debug!(?event, "received notify event");

            for path in event.paths {
                process_file_change(
                    fs.as_ref(),
                    &root,
                    &path,
                    &profiles,
                    &runtime_tx,
                    &mut file_cache,
                )
                .await;
            }

            if runtime_tx.is_closed() {
                break;
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle::new(watcher))
}
