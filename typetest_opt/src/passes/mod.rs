//! Simplification passes.
//!
//! Each pass rewrites the graph in place and reports how many rewrites it
//! made; [`PassPipeline`] reruns its passes until none of them changes
//! anything or the iteration bound is hit.

mod canonicalize;
mod redundancy;
mod virtualize;

pub use canonicalize::Canonicalize;
pub use redundancy::RedundantGuardElimination;
pub use virtualize::Virtualize;

use std::fmt;

use tracing::{debug, debug_span};

use crate::config::SimplifierConfig;
use crate::error::TypeTestResult;
use crate::graph::Graph;
use crate::typetest::Synonym;

/// Counters for the rewrites performed by a pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimplifyStats {
    /// Type tests replaced by `false`
    pub contradictions: usize,
    /// Type tests replaced by `true`
    pub tautologies: usize,
    /// Type tests replaced by a (negated) null check
    pub null_checks: usize,
    /// Type tests folded against virtual objects
    pub virtualization_folds: usize,
    /// Guard conditions decided by earlier guards
    pub implied_guards: usize,
    /// Guards dropped because they always pass
    pub removed_guards: usize,
}

impl SimplifyStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of rewrites.
    pub fn total(&self) -> usize {
        self.contradictions
            + self.tautologies
            + self.null_checks
            + self.virtualization_folds
            + self.implied_guards
            + self.removed_guards
    }

    pub fn merge(&mut self, other: &SimplifyStats) {
        self.contradictions += other.contradictions;
        self.tautologies += other.tautologies;
        self.null_checks += other.null_checks;
        self.virtualization_folds += other.virtualization_folds;
        self.implied_guards += other.implied_guards;
        self.removed_guards += other.removed_guards;
    }

    pub(crate) fn record_synonym(&mut self, synonym: Synonym) {
        match synonym {
            Synonym::Contradiction => self.contradictions += 1,
            Synonym::Tautology => self.tautologies += 1,
            Synonym::IsNull | Synonym::IsNotNull => self.null_checks += 1,
        }
    }
}

/// A graph rewrite.
pub trait SimplificationPass: fmt::Debug {
    fn name(&self) -> &str;

    /// Run once over the graph, returning the number of rewrites.
    fn run(&self, graph: &mut Graph, stats: &mut SimplifyStats) -> TypeTestResult<usize>;
}

/// Ordered passes run to a fixpoint.
#[derive(Debug)]
pub struct PassPipeline {
    passes: Vec<Box<dyn SimplificationPass>>,
    max_iterations: usize,
}

impl Default for PassPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl PassPipeline {
    /// An empty pipeline.
    pub fn new() -> Self {
        Self {
            passes: Vec::new(),
            max_iterations: SimplifierConfig::default().max_iterations,
        }
    }

    /// Every pass, in the default order.
    pub fn default_pipeline() -> Self {
        Self::from_config(&SimplifierConfig::default())
    }

    /// The passes enabled in `config`.
    pub fn from_config(config: &SimplifierConfig) -> Self {
        let mut pipeline = Self::new();
        pipeline.set_max_iterations(config.max_iterations);
        if config.canonicalize {
            pipeline.add_pass(Box::new(Canonicalize::new()));
        }
        if config.virtualize {
            pipeline.add_pass(Box::new(Virtualize::new()));
        }
        if config.eliminate_redundant_guards {
            pipeline.add_pass(Box::new(RedundantGuardElimination::new(
                config.narrow_after_guards,
            )));
        }
        pipeline
    }

    pub fn add_pass(&mut self, pass: Box<dyn SimplificationPass>) {
        self.passes.push(pass);
    }

    pub fn set_max_iterations(&mut self, max: usize) {
        self.max_iterations = max;
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    /// Run all passes until a round makes no change.
    pub fn run(&self, graph: &mut Graph) -> TypeTestResult<SimplifyStats> {
        let span = debug_span!("simplify", passes = self.passes.len());
        let _enter = span.enter();

        let mut stats = SimplifyStats::new();
        for iteration in 0..self.max_iterations {
            let mut changes_this_iteration = 0;
            for pass in &self.passes {
                let changes = pass.run(graph, &mut stats)?;
                if changes > 0 {
                    debug!(pass = pass.name(), iteration, changes, "pass changed the graph");
                }
                changes_this_iteration += changes;
            }

            // Fixed point reached
            if changes_this_iteration == 0 {
                break;
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pipeline_order() {
        let pipeline = PassPipeline::default_pipeline();
        assert_eq!(
            pipeline.pass_names(),
            vec!["canonicalize", "virtualize", "redundant_guard_elimination"]
        );
        assert_eq!(pipeline.max_iterations(), 10);
    }

    #[test]
    fn test_pipeline_from_config() {
        let config = SimplifierConfig {
            max_iterations: 2,
            virtualize: false,
            eliminate_redundant_guards: false,
            ..SimplifierConfig::default()
        };
        let pipeline = PassPipeline::from_config(&config);
        assert_eq!(pipeline.pass_names(), vec!["canonicalize"]);
        assert_eq!(pipeline.max_iterations(), 2);
    }

    #[test]
    fn test_empty_graph() {
        let pipeline = PassPipeline::default_pipeline();
        let mut graph = Graph::new();
        let stats = pipeline.run(&mut graph).unwrap();
        assert_eq!(stats, SimplifyStats::default());
    }

    #[test]
    fn test_stats_merge() {
        let mut stats = SimplifyStats {
            contradictions: 1,
            null_checks: 2,
            ..SimplifyStats::default()
        };
        stats.merge(&SimplifyStats {
            contradictions: 3,
            removed_guards: 1,
            ..SimplifyStats::default()
        });
        assert_eq!(stats.contradictions, 4);
        assert_eq!(stats.null_checks, 2);
        assert_eq!(stats.removed_guards, 1);
        assert_eq!(stats.total(), 7);
    }
}
