// src/watch/mod.rs

//! Source watching.
//!
//! This module is responsible for:
//! - Compiling one watch profile per transform from the path table.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Suppressing duplicate notifications for files whose content did not
//!   change (`blake3` content hashes).
//!
//! It does not run anything itself; it only turns filesystem changes into
//! [`RuntimeEvent::TaskTriggered`](crate::engine::RuntimeEvent) events.

pub mod cache;
pub mod event_handler;
pub mod hash;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use cache::FileCache;
pub use event_handler::process_file_change;
pub use patterns::{build_task_watch_profiles, tasks_for_path, TaskWatchProfile};
pub use watcher::{spawn_watcher, WatcherHandle};
