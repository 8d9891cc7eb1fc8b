//! Redundant guard elimination.
//!
//! Guards form a straight-line chain, so every guard is dominated by the
//! guards before it. A guard `(condition, negated)` that passes establishes
//! `condition == !negated` for the rest of the chain.

use tracing::debug;
use typetest_opt_lattice::ObjectStamp;

use super::{SimplificationPass, SimplifyStats};
use crate::error::TypeTestResult;
use crate::graph::{Graph, NarrowedView, NodeId, NodeKind};

/// Decides guard conditions from the facts established by earlier guards.
#[derive(Debug, Default)]
pub struct RedundantGuardElimination {
    /// Also narrow operand stamps with the facts and re-canonicalize the
    /// type tests later guards depend on.
    narrow: bool,
}

impl RedundantGuardElimination {
    pub fn new(narrow: bool) -> Self {
        Self { narrow }
    }
}

impl SimplificationPass for RedundantGuardElimination {
    fn name(&self) -> &str {
        "redundant_guard_elimination"
    }

    fn run(&self, graph: &mut Graph, stats: &mut SimplifyStats) -> TypeTestResult<usize> {
        let mut facts: Vec<(NodeId, bool)> = Vec::new();
        let mut view = NarrowedView::new();
        let mut changes = 0;

        for guard in graph.guards().to_vec() {
            let Some((mut condition, negated)) = graph.guard_condition(guard) else {
                continue;
            };

            if graph.node(condition).as_logic_constant().is_none() {
                if let Some(value) = implied_value(graph, &facts, condition) {
                    let constant = graph.logic_constant(value);
                    graph.replace_input(guard, condition, constant);
                    debug!(%guard, %condition, value, "guard condition implied by earlier guard");
                    graph.kill_if_unused(condition);
                    stats.implied_guards += 1;
                    changes += 1;
                    condition = constant;
                } else if self.narrow && !view.is_empty() {
                    if let Some(replacement) = narrowed_synonym(graph, &view, condition, stats)? {
                        graph.replace_input(guard, condition, replacement);
                        debug!(%guard, %condition, %replacement, "guard condition simplified under earlier guards");
                        graph.kill_if_unused(condition);
                        changes += 1;
                        condition = replacement;
                    }
                }
            }

            if let Some(value) = graph.node(condition).as_logic_constant() {
                if value != negated {
                    graph.kill(guard);
                    debug!(%guard, "removed guard that always passes");
                    stats.removed_guards += 1;
                    changes += 1;
                }
                // Anything after a guard that always fails is unreachable.
                continue;
            }

            facts.push((condition, negated));
            if self.narrow {
                record_fact(graph, &mut view, condition, negated);
            }
        }
        Ok(changes)
    }
}

/// Value of `condition` forced by one of the facts.
fn implied_value(graph: &Graph, facts: &[(NodeId, bool)], condition: NodeId) -> Option<bool> {
    facts
        .iter()
        .find_map(|&(fact, fact_negated)| graph.implies(fact, fact_negated, condition).to_bool())
}

/// Replacement for a type test that has a synonym under `view`.
fn narrowed_synonym(
    graph: &mut Graph,
    view: &NarrowedView,
    condition: NodeId,
    stats: &mut SimplifyStats,
) -> TypeTestResult<Option<NodeId>> {
    let Some(test) = graph.node(condition).as_type_test() else {
        return Ok(None);
    };
    let operand = test.operand();
    let Some(synonym) = test.canonical(graph, view)? else {
        return Ok(None);
    };
    stats.record_synonym(synonym);
    Ok(Some(synonym.materialize(graph, operand)))
}

/// Narrow `view` with `condition == !negated`.
fn record_fact(graph: &Graph, view: &mut NarrowedView, condition: NodeId, negated: bool) {
    match graph.node(condition).kind() {
        NodeKind::TypeTest(test) => {
            if let Some(stamp) = test.succeeding_stamp_for_value(negated) {
                view.narrow(test.operand(), stamp);
            }
        }
        NodeKind::IsNull(value) => {
            let stamp = if negated {
                ObjectStamp::any_non_null()
            } else {
                ObjectStamp::null()
            };
            view.narrow(*value, &stamp);
        }
        NodeKind::LogicNegation(inner) => record_fact(graph, view, *inner, !negated),
        _ => {}
    }
}

