//! Type hierarchy and stamp lattice.
//!
//! Stamps are the compiler's static description of the values an IR node
//! can produce. The type-test simplifier in `typetest_opt` reasons about
//! `instanceof` checks purely through the operations defined here.
//!
//! # Module structure
//!
//! - `hierarchy`: nominal types, subtyping, TOML loading
//! - `stamp`: object/primitive stamps with join and meet
//! - `tristate`: three-valued verdicts
//! - `error`: hierarchy definition errors

pub mod error;
pub mod hierarchy;
pub mod stamp;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod tristate;

pub use error::{HierarchyError, HierarchyResult};
pub use hierarchy::{ClassFlags, TypeHierarchy, TypeKind, TypeRef, ROOT_TYPE_NAME};
pub use stamp::{ObjectStamp, PrimitiveKind, Stamp, TypeSet};
pub use tristate::TriState;
