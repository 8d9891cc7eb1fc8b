//! Lowering hook.
//!
//! Type tests that survive simplification are handed to a backend, which
//! turns them into a class-pointer comparison, a hierarchy walk or a
//! runtime call. The engine only decides which tests remain.

use tracing::trace;

use crate::error::TypeTestResult;
use crate::graph::{Graph, NodeId};
use crate::typetest::TypeTestNode;

/// Backend consuming materialized type tests.
pub trait TypeTestLowerer {
    fn lower(&mut self, graph: &Graph, id: NodeId, test: &TypeTestNode) -> TypeTestResult<()>;
}

/// Hand every live type test to `lowerer` in node order. Returns how many
/// were lowered.
pub fn lower_type_tests(graph: &Graph, lowerer: &mut dyn TypeTestLowerer) -> TypeTestResult<usize> {
    let mut lowered = 0;
    for (id, node) in graph.iter() {
        if let Some(test) = node.as_type_test() {
            trace!(node = %id, ty = %test.type_ref(), "lowering type test");
            lowerer.lower(graph, id, test)?;
            lowered += 1;
        }
    }
    Ok(lowered)
}
