#![allow(dead_code)]

use sitepipe::pipeline::{run_series, TaskKind, TaskReport};
use sitepipe::types::Mode;
pub use sitepipe_test_utils::builders::{
    sample_gif, sample_jpeg, sample_png, Project, ProjectBuilder,
};
pub use sitepipe_test_utils::init_tracing;

/// Run the full transform series synchronously.
pub fn build(project: &Project, mode: Mode) -> Vec<TaskReport> {
    run_series(&TaskKind::SERIES, &project.context(mode)).expect("build failed")
}
