//! Minimal IR graph.
//!
//! Just enough of a sea-of-nodes graph to host type tests:
//! - **Arena storage**: nodes are addressed by [`NodeId`] and never move
//! - **Use lists**: every input edge is mirrored in the input's use list
//! - **Guard chain**: straight-line guards in program order
//! - **Replacement messages**: rewrites arrive as [`GraphEdit`] values and
//!   are applied by [`Graph::apply`]
//!
//! Killed nodes stay in the arena marked dead so that ids remain stable.

mod view;


pub use view::{DefaultView, NarrowedView, StampView};

use std::fmt;

use tracing::trace;
use typetest_opt_lattice::{ObjectStamp, PrimitiveKind, Stamp, TriState, TypeRef};

use crate::error::{TypeTestError, TypeTestResult};
use crate::profile::TypeProfile;
use crate::typetest::TypeTestNode;

/// Index of a node in its graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn new(index: u32) -> Self {
        NodeId(index)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Operation performed by a node, with its inputs.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Incoming argument
    Parameter(usize),
    /// The null reference
    NullConstant,
    IntConstant(i64),
    /// Boolean constant (the result of a folded test)
    LogicConstant(bool),
    /// Allocation of a fresh object of the given class
    NewInstance(TypeRef),
    /// `value` with its stamp narrowed by `narrowing`
    Pi {
        value: NodeId,
        narrowing: ObjectStamp,
    },
    /// Control-flow point that validates profiles
    Anchor,
    /// `value == null`
    IsNull(NodeId),
    /// Boolean negation
    LogicNegation(NodeId),
    /// `operand instanceof T`
    TypeTest(TypeTestNode),
    /// Deoptimizes unless `condition != negated`
    Guard { condition: NodeId, negated: bool },
}

impl NodeKind {
    /// Input edges in slot order.
    pub fn inputs(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Parameter(_)
            | NodeKind::NullConstant
            | NodeKind::IntConstant(_)
            | NodeKind::LogicConstant(_)
            | NodeKind::NewInstance(_)
            | NodeKind::Anchor => Vec::new(),
            NodeKind::Pi { value, .. } | NodeKind::IsNull(value) | NodeKind::LogicNegation(value) => {
                vec![*value]
            }
            NodeKind::TypeTest(node) => node.inputs(),
            NodeKind::Guard { condition, .. } => vec![*condition],
        }
    }

    /// Redirect every slot holding `old` to `new`, returning how many changed.
    fn replace_input(&mut self, old: NodeId, new: NodeId) -> usize {
        match self {
            NodeKind::Parameter(_)
            | NodeKind::NullConstant
            | NodeKind::IntConstant(_)
            | NodeKind::LogicConstant(_)
            | NodeKind::NewInstance(_)
            | NodeKind::Anchor => 0,
            NodeKind::Pi { value, .. } | NodeKind::IsNull(value) | NodeKind::LogicNegation(value) => {
                usize::from(swap_slot(value, old, new))
            }
            NodeKind::TypeTest(node) => node.replace_input(old, new),
            NodeKind::Guard { condition, .. } => usize::from(swap_slot(condition, old, new)),
        }
    }
}

pub(crate) fn swap_slot(slot: &mut NodeId, old: NodeId, new: NodeId) -> bool {
    if *slot == old {
        *slot = new;
        true
    } else {
        false
    }
}

/// A node and its stamp.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    kind: NodeKind,
    stamp: Stamp,
    dead: bool,
}

impl Node {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn stamp(&self) -> &Stamp {
        &self.stamp
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn inputs(&self) -> Vec<NodeId> {
        self.kind.inputs()
    }

    pub fn as_type_test(&self) -> Option<&TypeTestNode> {
        match &self.kind {
            NodeKind::TypeTest(node) => Some(node),
            _ => None,
        }
    }

    pub fn is_anchor(&self) -> bool {
        matches!(self.kind, NodeKind::Anchor)
    }

    /// Value of a logic constant.
    pub fn as_logic_constant(&self) -> Option<bool> {
        match self.kind {
            NodeKind::LogicConstant(value) => Some(value),
            _ => None,
        }
    }
}

/// What a replaced node turns into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Replacement {
    /// An existing node
    Node(NodeId),
    /// A logic constant, created on demand
    Constant(bool),
}

/// Request to replace `target` graph-wide and kill it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphEdit {
    pub target: NodeId,
    pub replacement: Replacement,
}

impl GraphEdit {
    pub fn node(target: NodeId, replacement: NodeId) -> Self {
        Self {
            target,
            replacement: Replacement::Node(replacement),
        }
    }

    pub fn constant(target: NodeId, value: bool) -> Self {
        Self {
            target,
            replacement: Replacement::Constant(value),
        }
    }
}

/// IR graph owning all nodes, their use lists and the guard chain.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    uses: Vec<Vec<NodeId>>,
    guards: Vec<NodeId>,
    logic_constants: [Option<NodeId>; 2],
    null_constant: Option<NodeId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Node Access
    // =========================================================================

    /// Get a node.
    ///
    /// Panics if `id` was not handed out by this graph. Use [`Graph::get`]
    /// for ids of unknown origin.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a node that has not been killed.
    pub fn live(&self, id: NodeId) -> TypeTestResult<&Node> {
        match self.get(id) {
            Some(node) if !node.dead => Ok(node),
            _ => Err(TypeTestError::DeadNode(id)),
        }
    }

    pub fn is_live(&self, id: NodeId) -> bool {
        self.live(id).is_ok()
    }

    #[inline]
    pub fn stamp(&self, id: NodeId) -> &Stamp {
        &self.node(id).stamp
    }

    /// Overwrite the stamp of a live node, e.g. after an external inference step.
    pub fn set_stamp(&mut self, id: NodeId, stamp: Stamp) -> TypeTestResult<()> {
        self.live(id)?;
        self.nodes[id.index()].stamp = stamp;
        Ok(())
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|node| !node.dead).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.dead)
            .map(|(index, node)| (NodeId(index as u32), node))
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.iter().map(|(id, _)| id)
    }

    pub fn type_test(&self, id: NodeId) -> TypeTestResult<&TypeTestNode> {
        self.live(id)?
            .as_type_test()
            .ok_or(TypeTestError::NotATypeTest(id))
    }

    /// Live type tests in creation order.
    pub fn type_tests(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.as_type_test().is_some())
            .map(|(id, _)| id)
            .collect()
    }

    /// Guards in program order.
    pub fn guards(&self) -> &[NodeId] {
        &self.guards
    }

    /// Condition and polarity of a guard.
    pub fn guard_condition(&self, id: NodeId) -> Option<(NodeId, bool)> {
        match self.node(id).kind {
            NodeKind::Guard { condition, negated } => Some((condition, negated)),
            _ => None,
        }
    }

    /// Fail unless `id` is a live anchor.
    pub fn check_anchor(&self, id: NodeId) -> TypeTestResult<()> {
        if self.live(id)?.is_anchor() {
            Ok(())
        } else {
            Err(TypeTestError::NotAnAnchor(id))
        }
    }

    // =========================================================================
    // Node Creation
    // =========================================================================

    /// Add a node and register it in the use lists of its inputs.
    pub fn add_node(&mut self, kind: NodeKind, stamp: Stamp) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let inputs = kind.inputs();
        let is_guard = matches!(kind, NodeKind::Guard { .. });
        self.nodes.push(Node {
            kind,
            stamp,
            dead: false,
        });
        self.uses.push(Vec::new());
        for input in inputs {
            self.add_use(input, id);
        }
        if is_guard {
            self.guards.push(id);
        }
        id
    }

    pub fn parameter(&mut self, index: usize, stamp: Stamp) -> NodeId {
        self.add_node(NodeKind::Parameter(index), stamp)
    }

    pub fn null_constant(&mut self) -> NodeId {
        if let Some(id) = self.null_constant.filter(|id| self.is_live(*id)) {
            return id;
        }
        let id = self.add_node(NodeKind::NullConstant, ObjectStamp::null().into());
        self.null_constant = Some(id);
        id
    }

    pub fn int_constant(&mut self, value: i64) -> NodeId {
        self.add_node(NodeKind::IntConstant(value), Stamp::Primitive(PrimitiveKind::Int))
    }

    /// The shared `true` or `false` node.
    pub fn logic_constant(&mut self, value: bool) -> NodeId {
        let slot = usize::from(value);
        if let Some(id) = self.logic_constants[slot].filter(|id| self.is_live(*id)) {
            return id;
        }
        let id = self.add_node(NodeKind::LogicConstant(value), Stamp::boolean());
        self.logic_constants[slot] = Some(id);
        id
    }

    pub fn new_instance(&mut self, class: &TypeRef) -> NodeId {
        self.add_node(
            NodeKind::NewInstance(class.clone()),
            ObjectStamp::exact_non_null(class).into(),
        )
    }

    /// `value` seen through extra type knowledge.
    pub fn pi(&mut self, value: NodeId, narrowing: ObjectStamp) -> NodeId {
        let stamp = self.stamp(value).improve_with(&narrowing);
        self.add_node(NodeKind::Pi { value, narrowing }, stamp)
    }

    pub fn anchor(&mut self) -> NodeId {
        self.add_node(NodeKind::Anchor, Stamp::Void)
    }

    /// `value == null`, folded when the stamp of `value` decides it.
    pub fn is_null(&mut self, value: NodeId) -> NodeId {
        if let Some(stamp) = self.stamp(value).as_object() {
            if stamp.always_null() {
                return self.logic_constant(true);
            }
            if stamp.non_null() {
                return self.logic_constant(false);
            }
        }
        self.add_node(NodeKind::IsNull(value), Stamp::boolean())
    }

    /// `!value`, folding constants and double negation.
    pub fn logic_negation(&mut self, value: NodeId) -> NodeId {
        match self.node(value).kind {
            NodeKind::LogicConstant(constant) => self.logic_constant(!constant),
            NodeKind::LogicNegation(inner) => inner,
            _ => self.add_node(NodeKind::LogicNegation(value), Stamp::boolean()),
        }
    }

    /// Append a guard to the guard chain.
    pub fn add_guard(&mut self, condition: NodeId, negated: bool) -> NodeId {
        self.add_node(NodeKind::Guard { condition, negated }, Stamp::Void)
    }

    // =========================================================================
    // Use Lists
    // =========================================================================

    /// Nodes that have `id` as an input, one entry per edge.
    pub fn uses(&self, id: NodeId) -> &[NodeId] {
        self.uses.get(id.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn use_count(&self, id: NodeId) -> usize {
        self.uses(id).len()
    }

    fn add_use(&mut self, def: NodeId, user: NodeId) {
        if let Some(uses) = self.uses.get_mut(def.index()) {
            uses.push(user);
        }
    }

    fn remove_use(&mut self, def: NodeId, user: NodeId) {
        if let Some(uses) = self.uses.get_mut(def.index()) {
            if let Some(pos) = uses.iter().position(|&u| u == user) {
                uses.swap_remove(pos);
            }
        }
    }

    /// Move one use of `user` from `old` to `new`, for optional edges such as
    /// a type test's anchor.
    pub fn update_usage(&mut self, user: NodeId, old: Option<NodeId>, new: Option<NodeId>) {
        if old == new {
            return;
        }
        if let Some(old) = old {
            self.remove_use(old, user);
        }
        if let Some(new) = new {
            self.add_use(new, user);
        }
    }

    // =========================================================================
    // Node Modification
    // =========================================================================

    /// Point every input slot of `node` that holds `old` at `new`.
    pub fn replace_input(&mut self, node: NodeId, old: NodeId, new: NodeId) {
        if old == new {
            return;
        }
        let changed = self.nodes[node.index()].kind.replace_input(old, new);
        for _ in 0..changed {
            self.remove_use(old, node);
            self.add_use(new, node);
        }
    }

    /// Redirect all users of `old` to `new`.
    pub fn replace_at_usages(&mut self, old: NodeId, new: NodeId) {
        if old == new {
            return;
        }
        let mut users = self.uses(old).to_vec();
        users.sort_unstable();
        users.dedup();
        for user in users {
            self.replace_input(user, old, new);
        }
    }

    /// Mark a node dead and drop its edges. Guards leave the guard chain.
    pub fn kill(&mut self, id: NodeId) {
        if self.nodes[id.index()].dead {
            return;
        }
        self.nodes[id.index()].dead = true;
        for input in self.nodes[id.index()].kind.inputs() {
            self.remove_use(input, id);
        }
        self.guards.retain(|&guard| guard != id);
    }

    /// Kill a logic node nothing uses anymore, then the logic inputs left
    /// unused by that. Returns how many nodes died.
    pub fn kill_if_unused(&mut self, id: NodeId) -> usize {
        let Some(node) = self.get(id) else {
            return 0;
        };
        let is_logic = matches!(
            node.kind,
            NodeKind::TypeTest(_) | NodeKind::IsNull(_) | NodeKind::LogicNegation(_)
        );
        if node.dead || !is_logic || self.use_count(id) > 0 {
            return 0;
        }
        let inputs = node.inputs();
        self.kill(id);
        trace!(node = %id, "killed unused logic node");
        1 + inputs
            .into_iter()
            .map(|input| self.kill_if_unused(input))
            .sum::<usize>()
    }

    /// Apply a replacement message: redirect the users of the target and
    /// kill it. Returns the node now standing in for the target.
    pub fn apply(&mut self, edit: GraphEdit) -> TypeTestResult<NodeId> {
        self.live(edit.target)?;
        let replacement = match edit.replacement {
            Replacement::Node(id) => {
                self.live(id)?;
                id
            }
            Replacement::Constant(value) => self.logic_constant(value),
        };
        if replacement == edit.target {
            return Ok(replacement);
        }
        trace!(node = %edit.target, replacement = %replacement, "replacing node");
        self.replace_at_usages(edit.target, replacement);
        let inputs = self.nodes[edit.target.index()].inputs();
        self.kill(edit.target);
        for input in inputs {
            self.kill_if_unused(input);
        }
        Ok(replacement)
    }

    /// Replace the profile and anchor of a type test as one step.
    ///
    /// The new pair is validated before anything changes, so a rejected
    /// update leaves the node and the anchor use lists untouched.
    pub fn set_type_test_profile(
        &mut self,
        id: NodeId,
        profile: Option<TypeProfile>,
        anchor: Option<NodeId>,
    ) -> TypeTestResult<()> {
        let operand = self.type_test(id)?.operand();
        if profile.is_some() && anchor.is_none() {
            return Err(TypeTestError::UnanchoredProfile { operand });
        }
        if let Some(anchor) = anchor {
            self.check_anchor(anchor)?;
        }
        let old_anchor = match &mut self.nodes[id.index()].kind {
            NodeKind::TypeTest(node) => node.replace_profile(profile, anchor),
            _ => return Err(TypeTestError::NotATypeTest(id)),
        };
        self.update_usage(id, old_anchor, anchor);
        Ok(())
    }

    // =========================================================================
    // Implication
    // =========================================================================

    /// What the outcome of `this` (negated when `this_negated`) says about
    /// the value of `other`. Ids foreign to this graph say nothing.
    pub fn implies(&self, this: NodeId, this_negated: bool, other: NodeId) -> TriState {
        let (Some(this_node), Some(other_node)) = (self.get(this), self.get(other)) else {
            return TriState::Unknown;
        };
        if this == other {
            return TriState::from_bool(!this_negated);
        }
        if let NodeKind::LogicNegation(inner) = other_node.kind {
            return self.implies(this, this_negated, inner).negate();
        }
        if let NodeKind::LogicNegation(inner) = this_node.kind {
            return self.implies(inner, !this_negated, other);
        }
        match (&this_node.kind, &other_node.kind) {
            (NodeKind::TypeTest(this_test), NodeKind::TypeTest(other_test)) => {
                this_test.implies(this_negated, other_test)
            }
            _ => TriState::Unknown,
        }
    }
}
