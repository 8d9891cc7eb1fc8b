//! Lattice operations on stamps.
//!
//! The orientation follows compiler stamps rather than abstract
//! interpretation textbooks:
//! - join (⊓ of possibilities): intersection, the value satisfies both stamps
//! - meet (⊔ of possibilities): union, the value satisfies either stamp
//!
//! Both operations may over-approximate (a nominal type set cannot describe
//! every set of classes), but never under-approximate: `join` only reports
//! an empty result when no value can satisfy both sides.

use super::types::{ObjectStamp, TypeSet};
use crate::hierarchy::TypeRef;

impl TypeSet {
    /// Intersection of two type sets.
    ///
    /// # Examples
    /// ```text
    /// Exact(Dog).join(Subtypes(Animal))     = Exact(Dog)
    /// Exact(Dog).join(Exact(Cat))           = Empty
    /// Subtypes(Dog).join(Subtypes(Animal))  = Subtypes(Dog)
    /// Subtypes(Dog).join(Subtypes(Robot))   = Empty        (single inheritance)
    /// Subtypes(Robot).join(Subtypes(Pet))   = Subtypes(Robot)  (a subclass may implement Pet)
    /// Any.join(T)                           = T
    /// ```
    pub fn join(&self, other: &TypeSet) -> TypeSet {
        match (self, other) {
            (TypeSet::Empty, _) | (_, TypeSet::Empty) => TypeSet::Empty,

            (TypeSet::Any, t) | (t, TypeSet::Any) => t.clone(),

            (TypeSet::Exact(a), TypeSet::Exact(b)) => {
                if a == b {
                    TypeSet::Exact(a.clone())
                } else {
                    TypeSet::Empty
                }
            }

            (TypeSet::Exact(exact), TypeSet::Subtypes(bound))
            | (TypeSet::Subtypes(bound), TypeSet::Exact(exact)) => {
                if exact.is_subtype_of(bound) {
                    TypeSet::exact(exact)
                } else {
                    TypeSet::Empty
                }
            }

            (TypeSet::Subtypes(a), TypeSet::Subtypes(b)) => Self::join_bounds(a, b),
        }
    }

    fn join_bounds(a: &TypeRef, b: &TypeRef) -> TypeSet {
        if a.is_subtype_of(b) {
            return TypeSet::subtypes(a);
        }
        if b.is_subtype_of(a) {
            return TypeSet::subtypes(b);
        }
        match (a.is_interface(), b.is_interface()) {
            // Unrelated classes share no instance.
            (false, false) => TypeSet::Empty,
            (false, true) => Self::class_and_interface(a),
            (true, false) => Self::class_and_interface(b),
            (true, true) => {
                if a.name() <= b.name() {
                    TypeSet::subtypes(a)
                } else {
                    TypeSet::subtypes(b)
                }
            }
        }
    }

    /// A class that does not implement an interface can still have a
    /// subclass that does, unless it is final.
    fn class_and_interface(class: &TypeRef) -> TypeSet {
        if class.is_final() {
            TypeSet::Empty
        } else {
            TypeSet::subtypes(class)
        }
    }

    /// Union of two type sets, widened to the closest nominal description.
    ///
    /// # Examples
    /// ```text
    /// Exact(Dog).meet(Exact(Dog))           = Exact(Dog)
    /// Exact(Dog).meet(Exact(Cat))           = Subtypes(Animal)
    /// Exact(Dog).meet(Subtypes(Animal))     = Subtypes(Animal)
    /// Subtypes(Dog).meet(Subtypes(Robot))   = Any
    /// Empty.meet(T)                         = T
    /// ```
    pub fn meet(&self, other: &TypeSet) -> TypeSet {
        match (self, other) {
            (TypeSet::Empty, t) | (t, TypeSet::Empty) => t.clone(),

            (TypeSet::Any, _) | (_, TypeSet::Any) => TypeSet::Any,

            (TypeSet::Exact(a), TypeSet::Exact(b)) if a == b => TypeSet::Exact(a.clone()),

            (left, right) => match (left.type_ref(), right.type_ref()) {
                (Some(a), Some(b)) => {
                    if !left.is_exact() && b.is_subtype_of(a) {
                        left.clone()
                    } else if !right.is_exact() && a.is_subtype_of(b) {
                        right.clone()
                    } else {
                        TypeSet::subtypes(&a.least_common_superclass(b))
                    }
                }
                _ => TypeSet::Any,
            },
        }
    }
}

impl ObjectStamp {
    /// Join (intersection): values satisfying both stamps.
    ///
    /// Null survives only if both sides allow it. A speculation is kept when
    /// it still describes a possible value and the two sides do not disagree.
    pub fn join(&self, other: &ObjectStamp) -> ObjectStamp {
        let types = self.types.join(&other.types);
        let may_be_null = self.may_be_null && other.may_be_null;

        let mut candidates = [self.speculated.as_ref(), other.speculated.as_ref()]
            .into_iter()
            .flatten()
            .filter(|ty| types.contains_instances_of(ty));
        let speculated = match (candidates.next(), candidates.next()) {
            (Some(first), None) => Some(first.clone()),
            (Some(first), Some(second)) if first == second => Some(first.clone()),
            _ => None,
        };

        ObjectStamp {
            types,
            may_be_null,
            speculated,
        }
    }

    /// Meet (union): values satisfying either stamp.
    ///
    /// Null survives if either side allows it. A speculation survives only
    /// when both sides carry the same one.
    pub fn meet(&self, other: &ObjectStamp) -> ObjectStamp {
        let speculated = match (&self.speculated, &other.speculated) {
            (Some(a), Some(b)) if a == b => Some(a.clone()),
            _ => None,
        };
        ObjectStamp {
            types: self.types.meet(&other.types),
            may_be_null: self.may_be_null || other.may_be_null,
            speculated,
        }
    }

    /// Type and nullability equality, ignoring speculative metadata.
    pub fn weak_equals(&self, other: &ObjectStamp) -> bool {
        self.types == other.types && self.may_be_null == other.may_be_null
    }
}
