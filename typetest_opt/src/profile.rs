//! Type profiles.
//!
//! Profiles are produced elsewhere (by an interpreter or a lower tier) and
//! only carried by type tests. The engine never changes their contents.

use typetest_opt_lattice::{TriState, TypeRef};

/// One receiver type observed at a profiled site.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfiledType {
    ty: TypeRef,
    probability: f64,
}

impl ProfiledType {
    pub fn new(ty: TypeRef, probability: f64) -> Self {
        Self { ty, probability }
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

/// Observed receiver types at a type test, with their frequencies.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeProfile {
    types: Vec<ProfiledType>,
    /// Probability mass of types that were seen but not recorded
    not_recorded: f64,
    null_seen: TriState,
}

impl TypeProfile {
    pub fn new(types: Vec<ProfiledType>, not_recorded: f64, null_seen: TriState) -> Self {
        Self {
            types,
            not_recorded,
            null_seen,
        }
    }

    pub fn types(&self) -> &[ProfiledType] {
        &self.types
    }

    pub fn not_recorded_probability(&self) -> f64 {
        self.not_recorded
    }

    pub fn null_seen(&self) -> TriState {
        self.null_seen
    }

    /// Every observed type is recorded.
    pub fn is_exhaustive(&self) -> bool {
        self.not_recorded <= 0.0
    }

    /// Most frequent recorded type.
    pub fn most_likely(&self) -> Option<&ProfiledType> {
        self.types
            .iter()
            .max_by(|a, b| a.probability.total_cmp(&b.probability))
    }
}
