//! Escape-analysis collaborator.
//!
//! Virtualization only needs one answer from escape analysis: what a node
//! stands for. [`EscapeState`] is a small stand-in that virtualizes every
//! allocation whose only uses are type tests, null checks and pi nodes.

use std::collections::HashMap;
use std::fmt;

use typetest_opt_lattice::{ObjectStamp, Stamp, TypeRef};

use crate::graph::{Graph, NodeId, NodeKind};

/// An allocation that was removed and is tracked by escape analysis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VirtualObject {
    allocation: NodeId,
    class: TypeRef,
}

impl VirtualObject {
    pub fn new(allocation: NodeId, class: TypeRef) -> Self {
        Self { allocation, class }
    }

    pub fn allocation(&self) -> NodeId {
        self.allocation
    }

    pub fn class(&self) -> &TypeRef {
        &self.class
    }

    /// A virtual object is never null and its class is known exactly.
    pub fn stamp(&self) -> ObjectStamp {
        ObjectStamp::exact_non_null(&self.class)
    }
}

/// What a node resolves to during virtualization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Alias {
    /// A materialized value
    Value(NodeId),
    /// A virtual object
    Virtual(VirtualObject),
}

impl Alias {
    pub fn stamp(&self, graph: &Graph) -> Stamp {
        match self {
            Alias::Value(id) => graph.stamp(*id).clone(),
            Alias::Virtual(object) => object.stamp().into(),
        }
    }
}

/// Alias resolution offered to nodes during virtualization.
pub trait VirtualizerTool: fmt::Debug {
    fn alias(&self, graph: &Graph, node: NodeId) -> Alias;
}

/// Virtual objects found in a graph.
#[derive(Clone, Debug, Default)]
pub struct EscapeState {
    virtual_objects: HashMap<NodeId, VirtualObject>,
}

impl EscapeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtualize every non-escaping allocation of `graph`.
    pub fn analyze(graph: &Graph) -> Self {
        let mut state = Self::new();
        for (id, node) in graph.iter() {
            if let NodeKind::NewInstance(class) = node.kind() {
                if !escapes(graph, id) {
                    state.add_virtual(VirtualObject::new(id, class.clone()));
                }
            }
        }
        state
    }

    pub fn add_virtual(&mut self, object: VirtualObject) {
        self.virtual_objects.insert(object.allocation, object);
    }

    pub fn virtual_object(&self, node: NodeId) -> Option<&VirtualObject> {
        self.virtual_objects.get(&node)
    }

    pub fn is_virtual(&self, node: NodeId) -> bool {
        self.virtual_objects.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.virtual_objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.virtual_objects.is_empty()
    }
}

impl VirtualizerTool for EscapeState {
    /// Pi nodes are looked through.
    fn alias(&self, graph: &Graph, node: NodeId) -> Alias {
        let mut current = node;
        loop {
            if let Some(object) = self.virtual_objects.get(&current) {
                return Alias::Virtual(object.clone());
            }
            match graph.node(current).kind() {
                NodeKind::Pi { value, .. } => current = *value,
                _ => return Alias::Value(node),
            }
        }
    }
}

/// Whether the value of `id` can be observed by anything but a type test,
/// a null check or a pi node that does not escape itself.
fn escapes(graph: &Graph, id: NodeId) -> bool {
    graph.uses(id).iter().any(|&user| match graph.node(user).kind() {
        NodeKind::TypeTest(test) => test.operand() != id,
        NodeKind::IsNull(_) => false,
        NodeKind::Pi { .. } => escapes(graph, user),
        _ => true,
    })
}
