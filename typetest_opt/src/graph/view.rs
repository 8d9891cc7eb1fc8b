//! Stamp views.
//!
//! Analyses read operand stamps through a [`StampView`] so that the same
//! query can run against the graph as built or against stamps narrowed by
//! facts established earlier on the current path.

use std::collections::HashMap;
use std::fmt;

use typetest_opt_lattice::{ObjectStamp, Stamp};

use super::{Graph, NodeId};

/// Source of the stamp an analysis should assume for a node.
pub trait StampView: fmt::Debug {
    fn stamp(&self, graph: &Graph, node: NodeId) -> Stamp;
}

/// The stamps stored in the graph.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultView;

impl StampView for DefaultView {
    fn stamp(&self, graph: &Graph, node: NodeId) -> Stamp {
        graph.stamp(node).clone()
    }
}

/// Graph stamps improved by per-node facts.
#[derive(Clone, Debug, Default)]
pub struct NarrowedView {
    facts: HashMap<NodeId, ObjectStamp>,
}

impl NarrowedView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `node` is known to lie within `stamp`. Facts accumulate.
    pub fn narrow(&mut self, node: NodeId, stamp: &ObjectStamp) {
        let fact = match self.facts.get(&node) {
            Some(existing) => existing.join(stamp),
            None => stamp.clone(),
        };
        self.facts.insert(node, fact);
    }

    pub fn fact(&self, node: NodeId) -> Option<&ObjectStamp> {
        self.facts.get(&node)
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl StampView for NarrowedView {
    fn stamp(&self, graph: &Graph, node: NodeId) -> Stamp {
        match self.facts.get(&node) {
            Some(fact) => graph.stamp(node).improve_with(fact),
            None => graph.stamp(node).clone(),
        }
    }
}
