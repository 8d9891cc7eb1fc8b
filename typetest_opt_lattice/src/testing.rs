//! Test fixtures shared with downstream crates.
//!
//! Compiled for this crate's own tests and, through the `testing` feature,
//! for the tests of crates that build on the lattice.

use crate::hierarchy::{TypeHierarchy, TypeRef};

/// A small hierarchy covering every shape the lattice distinguishes:
/// abstract and final classes, a class chain, an interface implemented
/// across branches, and unrelated roots.
///
/// ```text
/// Object ─┬─ Animal (abstract) ─┬─ Dog : Pet ── Puppy (final)
///         │                     ├─ Cat : Pet (final)
///         │                     └─ Bird
///         ├─ Robot
///         └─ Drone (final)
/// ```
pub const ZOO_TOML: &str = r#"
[[types]]
name = "Pet"
kind = "interface"

[[types]]
name = "Animal"
abstract = true

[[types]]
name = "Dog"
extends = "Animal"
implements = ["Pet"]

[[types]]
name = "Puppy"
extends = "Dog"
final = true

[[types]]
name = "Cat"
extends = "Animal"
implements = ["Pet"]
final = true

[[types]]
name = "Bird"
extends = "Animal"

[[types]]
name = "Robot"

[[types]]
name = "Drone"
final = true
"#;

/// Build the fixture hierarchy.
pub fn zoo() -> TypeHierarchy {
    TypeHierarchy::from_toml_str(ZOO_TOML).expect("fixture hierarchy is well-formed")
}

/// Look up a fixture type by name.
pub fn ty(hierarchy: &TypeHierarchy, name: &str) -> TypeRef {
    hierarchy
        .get(name)
        .cloned()
        .unwrap_or_else(|| panic!("unknown fixture type {}", name))
}

/// Every concrete runtime value of the hierarchy: null plus one object per
/// instantiable class.
pub fn concrete_values(hierarchy: &TypeHierarchy) -> Vec<Option<TypeRef>> {
    std::iter::once(None)
        .chain(
            hierarchy
                .types()
                .into_iter()
                .filter(|t| t.is_instantiable())
                .map(|t| Some(t.clone())),
        )
        .collect()
}
