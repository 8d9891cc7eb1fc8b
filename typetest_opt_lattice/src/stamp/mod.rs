//! Stamp lattice.
//!
//! # Module structure
//!
//! - `types`: `TypeSet`, `ObjectStamp`, `Stamp`, `PrimitiveKind`
//! - `ops`: join (intersection), meet (union), weak equality
//! - `display`: compact textual form used in logs and tests

mod display;
mod ops;
mod types;

pub use types::{ObjectStamp, PrimitiveKind, Stamp, TypeSet};
