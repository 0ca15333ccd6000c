// src/watch/patterns.rs

use std::fmt;

use globset::{GlobSet, GlobSetBuilder};

use crate::config::PathTable;
use crate::errors::Result;
use crate::pipeline::sources::compile_glob;
use crate::pipeline::TaskKind;

/// Compiled watch globs for a single transform.
///
/// The patterns are relative to the project root; the watcher passes
/// relative paths (e.g. `"app/js/a.js"`) into [`matches`](Self::matches).
#[derive(Clone)]
pub struct TaskWatchProfile {
    task: TaskKind,
    patterns: Vec<String>,
    watch_set: GlobSet,
}

impl fmt::Debug for TaskWatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskWatchProfile")
            .field("task", &self.task)
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl TaskWatchProfile {
    pub fn new(task: TaskKind, patterns: Vec<String>) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pat in &patterns {
            builder.add(compile_glob(pat)?);
        }
        Ok(Self {
            task,
            patterns,
            watch_set: builder.build()?,
        })
    }

    pub fn task(&self) -> TaskKind {
        self.task
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        self.watch_set.is_match(rel_path)
    }
}

/// One profile per transform.
///
/// Pages and views both feed the template task; every other task watches
/// exactly its own sources.
pub fn build_task_watch_profiles(table: &PathTable) -> Result<Vec<TaskWatchProfile>> {
    let source = &table.source;

    let mut templates = source.html.clone();
    templates.push(table.views.source.clone());

    Ok(vec![
        TaskWatchProfile::new(TaskKind::Templates, templates)?,
        TaskWatchProfile::new(TaskKind::Styles, source.scss.clone())?,
        TaskWatchProfile::new(TaskKind::Scripts, source.scripts.clone())?,
        TaskWatchProfile::new(TaskKind::Images, source.images.clone())?,
    ])
}

/// Tasks whose profile matches `rel_path`.
pub fn tasks_for_path(profiles: &[TaskWatchProfile], rel_path: &str) -> Vec<TaskKind> {
    profiles
        .iter()
        .filter(|p| p.matches(rel_path))
        .map(|p| p.task())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profiles() -> Vec<TaskWatchProfile> {
        build_task_watch_profiles(&PathTable::default()).unwrap()
    }

    #[test]
    fn each_source_triggers_only_its_own_task() {
        let p = profiles();
        assert_eq!(tasks_for_path(&p, "app/index.html"), vec![TaskKind::Templates]);
        assert_eq!(tasks_for_path(&p, "app/views/layout.njk"), vec![TaskKind::Templates]);
        assert_eq!(tasks_for_path(&p, "app/scss/main.scss"), vec![TaskKind::Styles]);
        assert_eq!(tasks_for_path(&p, "app/js/lib/util.js"), vec![TaskKind::Scripts]);
        assert_eq!(tasks_for_path(&p, "app/images/a/b.png"), vec![TaskKind::Images]);
    }

    #[test]
    fn unrelated_paths_trigger_nothing() {
        let p = profiles();
        assert!(tasks_for_path(&p, "build/index.html").is_empty());
        assert!(tasks_for_path(&p, "app/pages/about.html").is_empty());
        assert!(tasks_for_path(&p, "app/scss/_partial.scss").is_empty());
        assert!(tasks_for_path(&p, "app/images/notes.txt").is_empty());
    }

    #[test]
    fn invalid_glob_is_rejected() {
        assert!(TaskWatchProfile::new(TaskKind::Scripts, vec!["app/[js".into()]).is_err());
    }
}
