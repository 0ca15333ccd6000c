// src/plan/mod.rs

//! Entry-point composition.
//!
//! An entry point expands into an ordered chain of [`Step`]s. The chain is
//! held as a graph (edge `a -> b`: `b` starts after `a` finished) and
//! executed in topological order.

use std::fmt;

use clap::ValueEnum;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{Result, SitepipeError};
use crate::pipeline::TaskKind;

/// Named entry points selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EntryPoint {
    /// Build once, then watch sources and serve with live reload.
    #[default]
    Default,
    /// Build once and exit.
    Build,
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryPoint::Default => f.write_str("default"),
            EntryPoint::Build => f.write_str("build"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    Transform(TaskKind),
    Watch,
    Serve,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Transform(kind) => write!(f, "{kind}"),
            Step::Watch => f.write_str("watch"),
            Step::Serve => f.write_str("serve"),
        }
    }
}

/// Ordered steps for one entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPlan {
    entry: EntryPoint,
    steps: Vec<Step>,
}

impl TaskPlan {
    pub fn for_entry(entry: EntryPoint) -> Result<Self> {
        let mut chain: Vec<Step> = TaskKind::SERIES.iter().map(|k| Step::Transform(*k)).collect();
        if entry == EntryPoint::Default {
            chain.push(Step::Watch);
            chain.push(Step::Serve);
        }

        let mut graph: DiGraphMap<Step, ()> = DiGraphMap::new();
        for step in &chain {
            graph.add_node(*step);
        }
        for pair in chain.windows(2) {
            graph.add_edge(pair[0], pair[1], ());
        }

        let steps = toposort(&graph, None).map_err(|cycle| {
            SitepipeError::ConfigError(format!(
                "cycle in plan for '{entry}' at step '{}'",
                cycle.node_id()
            ))
        })?;

        Ok(Self { entry, steps })
    }

    pub fn entry(&self) -> EntryPoint {
        self.entry
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The transform steps, in order.
    pub fn transforms(&self) -> Vec<TaskKind> {
        self.steps
            .iter()
            .filter_map(|step| match step {
                Step::Transform(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for TaskPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.steps.iter().map(|s| s.to_string()).collect();
        write!(f, "{}: {}", self.entry, names.join(" -> "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_runs_the_four_transforms_in_order() {
        let plan = TaskPlan::for_entry(EntryPoint::Build).unwrap();
        assert_eq!(plan.transforms(), TaskKind::SERIES.to_vec());
        assert!(!plan.steps().contains(&Step::Watch));
        assert!(!plan.steps().contains(&Step::Serve));
    }

    #[test]
    fn default_watches_then_serves_after_the_series() {
        let plan = TaskPlan::for_entry(EntryPoint::Default).unwrap();
        assert_eq!(
            plan.steps(),
            &[
                Step::Transform(TaskKind::Templates),
                Step::Transform(TaskKind::Styles),
                Step::Transform(TaskKind::Scripts),
                Step::Transform(TaskKind::Images),
                Step::Watch,
                Step::Serve,
            ]
        );
    }

    #[test]
    fn display_lists_steps() {
        let plan = TaskPlan::for_entry(EntryPoint::Build).unwrap();
        assert_eq!(plan.to_string(), "build: templates -> styles -> scripts -> images");
    }
}
