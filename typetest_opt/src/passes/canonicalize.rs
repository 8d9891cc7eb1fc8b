use tracing::debug;

use super::{SimplificationPass, SimplifyStats};
use crate::error::TypeTestResult;
use crate::graph::{DefaultView, Graph, GraphEdit};

/// Replaces type tests by the synonym their operand's current stamp allows.
#[derive(Debug, Default)]
pub struct Canonicalize;

impl Canonicalize {
    pub fn new() -> Self {
        Self
    }
}

impl SimplificationPass for Canonicalize {
    fn name(&self) -> &str {
        "canonicalize"
    }

    fn run(&self, graph: &mut Graph, stats: &mut SimplifyStats) -> TypeTestResult<usize> {
        let mut changes = 0;
        for id in graph.type_tests() {
            let test = graph.type_test(id)?;
            let operand = test.operand();
            let Some(synonym) = test.canonical(graph, &DefaultView)? else {
                continue;
            };
            let edit = match synonym.constant() {
                Some(value) => GraphEdit::constant(id, value),
                None => GraphEdit::node(id, synonym.materialize(graph, operand)),
            };
            graph.apply(edit)?;
            debug!(node = %id, %synonym, "canonicalized type test");
            stats.record_synonym(synonym);
            changes += 1;
        }
        Ok(changes)
    }
}
