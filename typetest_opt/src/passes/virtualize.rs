use tracing::debug;

use super::{SimplificationPass, SimplifyStats};
use crate::error::TypeTestResult;
use crate::escape::EscapeState;
use crate::graph::Graph;

/// Folds type tests whose operand is a virtual object of known class.
#[derive(Debug, Default)]
pub struct Virtualize;

impl Virtualize {
    pub fn new() -> Self {
        Self
    }
}

impl SimplificationPass for Virtualize {
    fn name(&self) -> &str {
        "virtualize"
    }

    fn run(&self, graph: &mut Graph, stats: &mut SimplifyStats) -> TypeTestResult<usize> {
        let state = EscapeState::analyze(graph);
        let mut changes = 0;
        for id in graph.type_tests() {
            let Some(edit) = graph.type_test(id)?.virtualize(id, graph, &state) else {
                continue;
            };
            graph.apply(edit)?;
            debug!(node = %id, replacement = ?edit.replacement, "folded type test on virtual object");
            stats.virtualization_folds += 1;
            changes += 1;
        }
        Ok(changes)
    }
}
