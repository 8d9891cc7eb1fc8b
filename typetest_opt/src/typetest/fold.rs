//! Constant folding of type tests.

use tracing::trace;
use typetest_opt_lattice::{ObjectStamp, Stamp, TriState};

use super::TypeTestNode;
use crate::escape::VirtualizerTool;
use crate::graph::{Graph, GraphEdit, NodeId};

/// Outcome of testing a value of stamp `value` against `checked`.
///
/// Unlike synonym resolution this never yields a null check: the answer is
/// definite or unknown. Tautologies need strong equality, so a speculative
/// type on either side keeps the verdict unknown.
pub fn try_fold(checked: &ObjectStamp, value: &Stamp) -> TriState {
    let Some(input) = value.as_object() else {
        return TriState::Unknown;
    };
    if checked.join(input).is_empty() {
        return TriState::False;
    }
    if *checked == checked.meet(input) {
        return TriState::True;
    }
    TriState::Unknown
}

impl TypeTestNode {
    pub fn try_fold(&self, value: &Stamp) -> TriState {
        try_fold(&self.checked_stamp, value)
    }

    /// Fold the test at `id` against what escape analysis knows about the
    /// operand. Returns the replacement to apply when the verdict is definite.
    pub fn virtualize(
        &self,
        id: NodeId,
        graph: &Graph,
        tool: &dyn VirtualizerTool,
    ) -> Option<GraphEdit> {
        let alias = tool.alias(graph, self.operand);
        let verdict = self.try_fold(&alias.stamp(graph));
        trace!(node = %id, ?alias, %verdict, "virtualized type test");
        verdict.to_bool().map(|value| GraphEdit::constant(id, value))
    }
}
