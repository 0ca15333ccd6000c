// src/serve/reload.rs

//! Output watching for the live-reload channel.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use globset::{GlobSet, GlobSetBuilder};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::config::BuildConfig;
use crate::errors::Result;
use crate::pipeline::sources::compile_glob;
use crate::watch::path_utils::relative_str;
use crate::watch::watcher::forward_notify_events;
use crate::watch::WatcherHandle;

/// Quiet period used to fold a burst of output writes into one push.
const SETTLE: Duration = Duration::from_millis(100);

/// What connected browsers should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadKind {
    /// Re-fetch stylesheets in place.
    Css,
    /// Reload the page.
    Full,
}

impl ReloadKind {
    pub fn for_path(rel_path: &str) -> Self {
        if rel_path.ends_with(".css") {
            ReloadKind::Css
        } else {
            ReloadKind::Full
        }
    }

    /// Text frame sent over the websocket.
    pub fn message(self) -> &'static str {
        match self {
            ReloadKind::Css => "css",
            ReloadKind::Full => "reload",
        }
    }

    /// Combine two pending reloads; a full reload covers a CSS one.
    pub fn merge(self, other: ReloadKind) -> ReloadKind {
        if self == ReloadKind::Css && other == ReloadKind::Css {
            ReloadKind::Css
        } else {
            ReloadKind::Full
        }
    }
}

impl fmt::Display for ReloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Compiled `serve.path_list`, relative to the project root.
#[derive(Debug, Clone)]
pub struct ReloadFilter {
    set: GlobSet,
}

impl ReloadFilter {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pat in patterns {
            builder.add(compile_glob(pat)?);
        }
        Ok(Self {
            set: builder.build()?,
        })
    }

    /// Reload to push for a changed output path, if it is served.
    pub fn classify(&self, rel_path: &str) -> Option<ReloadKind> {
        self.set
            .is_match(rel_path)
            .then(|| ReloadKind::for_path(rel_path))
    }
}

/// Watch the served directory and broadcast reloads for paths in
/// `serve.path_list`.
pub fn spawn_reload_watcher(
    config: &BuildConfig,
    reload_tx: broadcast::Sender<ReloadKind>,
) -> Result<WatcherHandle> {
    let filter = ReloadFilter::new(&config.table().serve.path_list)?;
    let root = config.root().to_path_buf();
    let serve_dir = config.serve_dir();

    // The first build normally creates it, but an empty project may not.
    std::fs::create_dir_all(&serve_dir)?;

    let (watcher, mut event_rx) = forward_notify_events(&serve_dir)?;
    info!("watching {:?} for live reload", serve_dir);

    let root = root.canonicalize().unwrap_or(root);

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let mut pending = classify_paths(&filter, &root, &event.paths);

            // Fold the rest of the burst.
            tokio::time::sleep(SETTLE).await;
            while let Ok(event) = event_rx.try_recv() {
                let more = classify_paths(&filter, &root, &event.paths);
                pending = match (pending, more) {
                    (Some(a), Some(b)) => Some(a.merge(b)),
                    (a, b) => a.or(b),
                };
            }

            if let Some(kind) = pending {
                debug!(%kind, clients = reload_tx.receiver_count(), "pushing reload");
                // No receivers just means no browser is connected.
                let _ = reload_tx.send(kind);
            }
        }
        debug!("reload watcher finished");
    });

    Ok(WatcherHandle::new(watcher))
}

fn classify_paths(filter: &ReloadFilter, root: &Path, paths: &[PathBuf]) -> Option<ReloadKind> {
    paths
        .iter()
        .filter_map(|p| relative_str(root, p))
        .filter_map(|rel| filter.classify(&rel))
        .reduce(ReloadKind::merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathTable;

    fn filter() -> ReloadFilter {
        ReloadFilter::new(&PathTable::default().serve.path_list).unwrap()
    }

    #[test]
    fn stylesheets_are_injected_everything_else_reloads() {
        let f = filter();
        assert_eq!(f.classify("build/css/main.css"), Some(ReloadKind::Css));
        assert_eq!(f.classify("build/index.html"), Some(ReloadKind::Full));
        assert_eq!(f.classify("build/js/index.js"), Some(ReloadKind::Full));
        assert_eq!(f.classify("build/images/a/b.png"), Some(ReloadKind::Full));
    }

    #[test]
    fn unlisted_outputs_are_ignored() {
        let f = filter();
        assert_eq!(f.classify("build/notes.txt"), None);
        assert_eq!(f.classify("public/index.html"), None);
    }

    #[test]
    fn burst_with_any_full_reload_is_full() {
        let f = filter();
        let root = Path::new("/site");
        let css_only = [PathBuf::from("/site/build/css/a.css")];
        let mixed = [
            PathBuf::from("/site/build/css/a.css"),
            PathBuf::from("/site/build/index.html"),
        ];

        assert_eq!(classify_paths(&f, root, &css_only), Some(ReloadKind::Css));
        assert_eq!(classify_paths(&f, root, &mixed), Some(ReloadKind::Full));
        assert_eq!(classify_paths(&f, root, &[]), None);
    }

    #[test]
    fn messages_match_client_protocol() {
        assert_eq!(ReloadKind::Css.message(), "css");
        assert_eq!(ReloadKind::Full.message(), "reload");
    }
}
