//! Shared helpers for integration tests
// Each test target uses a different subset of these helpers.
#![allow(dead_code)]

use typetest_opt::{Graph, NodeId, TypeTestNode};
use typetest_opt_lattice::testing::{self, zoo};
use typetest_opt_lattice::{ObjectStamp, TypeHierarchy, TypeRef};

/// Route `tracing` output to the test harness. Set `RUST_LOG=typetest_opt=trace`
/// to see every rewrite.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A graph over the fixture hierarchy.
#[derive(Debug)]
pub struct Fixture {
    pub hierarchy: TypeHierarchy,
    pub graph: Graph,
}

impl Fixture {
    pub fn new() -> Self {
        init_tracing();
        Self {
            hierarchy: zoo(),
            graph: Graph::new(),
        }
    }

    pub fn ty(&self, name: &str) -> TypeRef {
        testing::ty(&self.hierarchy, name)
    }

    /// A parameter with the given stamp.
    pub fn param(&mut self, stamp: ObjectStamp) -> NodeId {
        let index = self.graph.len();
        self.graph.parameter(index, stamp.into())
    }

    /// A parameter that may hold any object or null.
    pub fn any_param(&mut self) -> NodeId {
        self.param(ObjectStamp::any())
    }

    /// `operand instanceof name`, null rejected.
    pub fn instance_of(&mut self, name: &str, operand: NodeId) -> NodeId {
        let ty = self.ty(name);
        TypeTestNode::create(&mut self.graph, &ty, operand).expect("type test")
    }
}
