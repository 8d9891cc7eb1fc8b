//! The `instanceof` node.
//!
//! A [`TypeTestNode`] checks whether its operand lies within a checked
//! stamp. The factories never allocate a node when a simpler equivalent
//! exists (see [`find_synonym`]); the node then only survives until a
//! later pass can prove more about the operand.
//!
//! Invariant: a profile is always paired with an anchor. Both the factories
//! and [`Graph::set_type_test_profile`] reject an unanchored profile before
//! touching the graph.

mod fold;
mod implies;
mod synonym;


pub use fold::try_fold;
pub use synonym::{find_synonym, find_synonym_for, Synonym};

use tracing::trace;
use typetest_opt_lattice::{ObjectStamp, Stamp, TypeRef};

use crate::error::{TypeTestError, TypeTestResult};
use crate::graph::{swap_slot, DefaultView, Graph, NodeId, NodeKind, StampView};
use crate::profile::TypeProfile;

/// `operand instanceof T` with an explicit null policy.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeTestNode {
    operand: NodeId,
    checked_stamp: ObjectStamp,
    /// Nominal type of `checked_stamp`, resolved at construction
    type_ref: TypeRef,
    profile: Option<TypeProfile>,
    anchor: Option<NodeId>,
}

impl TypeTestNode {
    fn new(
        checked_stamp: ObjectStamp,
        operand: NodeId,
        profile: Option<TypeProfile>,
        anchor: Option<NodeId>,
    ) -> TypeTestResult<Self> {
        if profile.is_some() && anchor.is_none() {
            return Err(TypeTestError::UnanchoredProfile { operand });
        }
        let type_ref = checked_stamp
            .type_ref()
            .cloned()
            .ok_or_else(|| TypeTestError::UnresolvedType {
                stamp: checked_stamp.to_string(),
            })?;
        Ok(Self {
            operand,
            checked_stamp,
            type_ref,
            profile,
            anchor,
        })
    }

    // =========================================================================
    // Factories
    // =========================================================================

    /// Test for non-null instances of `ty` or its subtypes.
    pub fn create(graph: &mut Graph, ty: &TypeRef, operand: NodeId) -> TypeTestResult<NodeId> {
        Self::create_profiled(graph, ty, operand, None, None)
    }

    /// Like [`TypeTestNode::create`], carrying a profile valid at `anchor`.
    pub fn create_profiled(
        graph: &mut Graph,
        ty: &TypeRef,
        operand: NodeId,
        profile: Option<TypeProfile>,
        anchor: Option<NodeId>,
    ) -> TypeTestResult<NodeId> {
        Self::create_with_stamp(graph, ObjectStamp::object_non_null(ty), operand, profile, anchor)
    }

    /// Test that also succeeds for null.
    ///
    /// When the operand is already known to be non-null this is the ordinary
    /// non-null test.
    pub fn create_allow_null(
        graph: &mut Graph,
        ty: &TypeRef,
        operand: NodeId,
        profile: Option<TypeProfile>,
        anchor: Option<NodeId>,
    ) -> TypeTestResult<NodeId> {
        let input = operand_stamp(graph, &DefaultView, operand)?;
        if input.non_null() {
            return Self::create_profiled(graph, ty, operand, profile, anchor);
        }
        Self::create_with_stamp(graph, ObjectStamp::object(ty), operand, profile, anchor)
    }

    /// Build the simplest fragment equivalent to testing `operand` against
    /// `checked`: a synonym if one exists, a new type test otherwise.
    pub fn create_with_stamp(
        graph: &mut Graph,
        checked: ObjectStamp,
        operand: NodeId,
        profile: Option<TypeProfile>,
        anchor: Option<NodeId>,
    ) -> TypeTestResult<NodeId> {
        if profile.is_some() && anchor.is_none() {
            return Err(TypeTestError::UnanchoredProfile { operand });
        }
        if let Some(anchor) = anchor {
            graph.check_anchor(anchor)?;
        }
        if let Some(synonym) = find_synonym_for(graph, &DefaultView, &checked, operand)? {
            trace!(%operand, %checked, %synonym, "type test replaced at creation");
            return Ok(synonym.materialize(graph, operand));
        }
        let node = TypeTestNode::new(checked, operand, profile, anchor)?;
        Ok(graph.add_node(NodeKind::TypeTest(node), Stamp::boolean()))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn operand(&self) -> NodeId {
        self.operand
    }

    pub fn checked_stamp(&self) -> &ObjectStamp {
        &self.checked_stamp
    }

    /// The type being tested for.
    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    pub fn profile(&self) -> Option<&TypeProfile> {
        self.profile.as_ref()
    }

    pub fn anchor(&self) -> Option<NodeId> {
        self.anchor
    }

    /// Whether the test succeeds for null.
    pub fn allows_null(&self) -> bool {
        !self.checked_stamp.non_null()
    }

    /// Stamp the operand is known to have once the test has evaluated to
    /// `!negated`. A failed test says nothing expressible as a stamp.
    pub fn succeeding_stamp_for_value(&self, negated: bool) -> Option<&ObjectStamp> {
        (!negated).then_some(&self.checked_stamp)
    }

    /// Re-run synonym resolution against the operand's current stamp.
    pub fn canonical(
        &self,
        graph: &Graph,
        view: &dyn StampView,
    ) -> TypeTestResult<Option<Synonym>> {
        find_synonym_for(graph, view, &self.checked_stamp, self.operand)
    }

    // =========================================================================
    // Graph bookkeeping
    // =========================================================================

    pub(crate) fn inputs(&self) -> Vec<NodeId> {
        std::iter::once(self.operand).chain(self.anchor).collect()
    }

    pub(crate) fn replace_input(&mut self, old: NodeId, new: NodeId) -> usize {
        let mut changed = usize::from(swap_slot(&mut self.operand, old, new));
        if let Some(anchor) = self.anchor.as_mut() {
            changed += usize::from(swap_slot(anchor, old, new));
        }
        changed
    }

    /// Swap in a new profile and anchor, returning the previous anchor.
    pub(crate) fn replace_profile(
        &mut self,
        profile: Option<TypeProfile>,
        anchor: Option<NodeId>,
    ) -> Option<NodeId> {
        self.profile = profile;
        std::mem::replace(&mut self.anchor, anchor)
    }
}

/// Object stamp of `operand` under `view`.
pub(crate) fn operand_stamp(
    graph: &Graph,
    view: &dyn StampView,
    operand: NodeId,
) -> TypeTestResult<ObjectStamp> {
    graph.live(operand)?;
    match view.stamp(graph, operand) {
        Stamp::Object(stamp) => Ok(stamp),
        Stamp::Primitive(_) | Stamp::Void => Err(TypeTestError::NonObjectOperand(operand)),
    }
}
