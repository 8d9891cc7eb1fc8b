// Library code never prints; rewrites are reported through `tracing`.
#![deny(clippy::print_stderr, clippy::print_stdout)]

//! Static simplification of `instanceof` type tests.
//!
//! A type test is kept in the IR only while nothing better is known about
//! its operand. Passes over the graph replace it by a constant, a null
//! check, or a fold against a virtual object, and use implications between
//! tests to drop redundant guards.

// IR graph and stamp views
pub mod graph;

// The type-test node: factories, synonyms, folding, implication
pub mod typetest;

// Profiles carried by type tests
pub mod profile;

// Escape-analysis alias resolution
pub mod escape;

// Pass pipeline
pub mod passes;

// Backend hook for surviving type tests
pub mod lower;

pub mod config;
pub mod error;

pub use config::SimplifierConfig;
pub use error::{ConfigError, TypeTestError, TypeTestResult};
pub use escape::{Alias, EscapeState, VirtualObject, VirtualizerTool};
pub use graph::{
    DefaultView, Graph, GraphEdit, NarrowedView, Node, NodeId, NodeKind, Replacement, StampView,
};
pub use lower::{lower_type_tests, TypeTestLowerer};
pub use passes::{
    Canonicalize, PassPipeline, RedundantGuardElimination, SimplificationPass, SimplifyStats,
    Virtualize,
};
pub use profile::{ProfiledType, TypeProfile};
pub use typetest::{find_synonym, find_synonym_for, try_fold, Synonym, TypeTestNode};
