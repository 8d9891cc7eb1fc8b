//! Synonym resolution.
//!
//! Decides whether a type test is equivalent to something cheaper given
//! what is known about its operand. The checks run in a fixed order:
//! contradiction and tautology come before any nullability rewrite.

use std::fmt;

use tracing::trace;
use typetest_opt_lattice::ObjectStamp;

use super::operand_stamp;
use crate::error::{TypeTestError, TypeTestResult};
use crate::graph::{Graph, NodeId, StampView};

/// Cheaper fragment equivalent to a type test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Synonym {
    /// The test never succeeds
    Contradiction,
    /// The test always succeeds
    Tautology,
    /// The test succeeds exactly for null
    IsNull,
    /// The test succeeds exactly for non-null values
    IsNotNull,
}

impl Synonym {
    /// Constant value of the test, if it has one.
    pub fn constant(self) -> Option<bool> {
        match self {
            Synonym::Contradiction => Some(false),
            Synonym::Tautology => Some(true),
            Synonym::IsNull | Synonym::IsNotNull => None,
        }
    }

    /// Build the fragment over `operand`.
    pub fn materialize(self, graph: &mut Graph, operand: NodeId) -> NodeId {
        match self {
            Synonym::Contradiction => graph.logic_constant(false),
            Synonym::Tautology => graph.logic_constant(true),
            Synonym::IsNull => graph.is_null(operand),
            Synonym::IsNotNull => {
                let is_null = graph.is_null(operand);
                graph.logic_negation(is_null)
            }
        }
    }
}

impl fmt::Display for Synonym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Synonym::Contradiction => f.write_str("false"),
            Synonym::Tautology => f.write_str("true"),
            Synonym::IsNull => f.write_str("is_null"),
            Synonym::IsNotNull => f.write_str("!is_null"),
        }
    }
}

/// Find a synonym for testing a value of stamp `input` against `checked`.
///
/// Returns `Ok(None)` when the test has to stay. The only error is an
/// inconsistent lattice reaching the null-degeneration step.
pub fn find_synonym(
    checked: &ObjectStamp,
    input: &ObjectStamp,
) -> TypeTestResult<Option<Synonym>> {
    let joined = checked.join(input);
    if joined.is_empty() {
        trace!(%checked, %input, "no value passes the test");
        return Ok(Some(Synonym::Contradiction));
    }

    let met = checked.meet(input);
    if checked.weak_equals(&met) {
        trace!(%checked, %input, "every value passes the test");
        return Ok(Some(Synonym::Tautology));
    }

    if checked.always_null() {
        return Ok(Some(Synonym::IsNull));
    }

    // Same type, exactness and null-only status: nullability is the only
    // remaining difference.
    if checked.type_ref() == met.type_ref()
        && checked.is_exact_type() == met.is_exact_type()
        && checked.always_null() == met.always_null()
    {
        if checked.non_null() == input.non_null() {
            return Err(TypeTestError::NullabilityInvariant {
                checked: checked.to_string(),
                input: input.to_string(),
            });
        }
        trace!(%checked, %input, "test reduces to a null check");
        return Ok(Some(if checked.non_null() {
            Synonym::IsNotNull
        } else {
            Synonym::IsNull
        }));
    }

    Ok(None)
}

/// [`find_synonym`] against the stamp `view` reports for `operand`.
pub fn find_synonym_for(
    graph: &Graph,
    view: &dyn StampView,
    checked: &ObjectStamp,
    operand: NodeId,
) -> TypeTestResult<Option<Synonym>> {
    let input = operand_stamp(graph, view, operand)?;
    find_synonym(checked, &input)
}
