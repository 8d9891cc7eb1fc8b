//! Stamp definitions.
//!
//! A stamp describes everything the compiler knows about the runtime value
//! flowing through an IR node. Object stamps split that knowledge into two
//! orthogonal axes:
//!
//! ```text
//!   object part (TypeSet)          null part
//!   ─────────────────────          ─────────
//!   Any            all objects     may_be_null = true   null allowed
//!   Subtypes(T)    class <: T      may_be_null = false  null excluded
//!   Exact(T)       class == T
//!   Empty          no object
//! ```
//!
//! `Empty` + null allowed is the "always null" stamp; `Empty` + null
//! excluded is the empty stamp (no value at all, e.g. unreachable code).

use crate::hierarchy::TypeRef;

/// The non-null object part of an object stamp.
///
/// Build values through [`TypeSet::subtypes`] and [`TypeSet::exact`], which
/// normalise equivalent descriptions to a single variant so that structural
/// equality is meaningful.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeSet {
    /// No object at all
    Empty,
    /// Any object
    Any,
    /// Instances of the type or any of its subtypes
    Subtypes(TypeRef),
    /// Instances of exactly this type
    Exact(TypeRef),
}

impl TypeSet {
    /// Instances of `ty` or any subtype.
    ///
    /// The root collapses to `Any` and a final class to `Exact`.
    pub fn subtypes(ty: &TypeRef) -> TypeSet {
        if ty.is_root() {
            TypeSet::Any
        } else if ty.is_final() {
            TypeSet::exact(ty)
        } else {
            TypeSet::Subtypes(ty.clone())
        }
    }

    /// Instances of exactly `ty`. Abstract classes and interfaces have none.
    pub fn exact(ty: &TypeRef) -> TypeSet {
        if ty.is_instantiable() {
            TypeSet::Exact(ty.clone())
        } else {
            TypeSet::Empty
        }
    }

    /// Nominal type, if the set names one.
    pub fn type_ref(&self) -> Option<&TypeRef> {
        match self {
            TypeSet::Subtypes(ty) | TypeSet::Exact(ty) => Some(ty),
            TypeSet::Empty | TypeSet::Any => None,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, TypeSet::Exact(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TypeSet::Empty)
    }

    /// Whether an object whose runtime class is exactly `class` belongs to this set.
    pub fn contains_instances_of(&self, class: &TypeRef) -> bool {
        if !class.is_instantiable() {
            return false;
        }
        match self {
            TypeSet::Empty => false,
            TypeSet::Any => true,
            TypeSet::Subtypes(ty) => class.is_subtype_of(ty),
            TypeSet::Exact(ty) => class == ty,
        }
    }
}

/// Lattice value for reference-typed nodes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectStamp {
    pub(crate) types: TypeSet,
    pub(crate) may_be_null: bool,
    /// Speculative exact type (e.g. from a monomorphic profile). Ignored by
    /// [`ObjectStamp::weak_equals`].
    pub(crate) speculated: Option<TypeRef>,
}

impl ObjectStamp {
    pub fn new(types: TypeSet, may_be_null: bool) -> Self {
        Self {
            types,
            may_be_null,
            speculated: None,
        }
    }

    /// `ty` or any subtype, null allowed.
    pub fn object(ty: &TypeRef) -> Self {
        Self::new(TypeSet::subtypes(ty), true)
    }

    /// `ty` or any subtype, never null.
    pub fn object_non_null(ty: &TypeRef) -> Self {
        Self::new(TypeSet::subtypes(ty), false)
    }

    /// Exactly `ty`, null allowed.
    pub fn exact(ty: &TypeRef) -> Self {
        Self::new(TypeSet::exact(ty), true)
    }

    /// Exactly `ty`, never null (a fresh allocation).
    pub fn exact_non_null(ty: &TypeRef) -> Self {
        Self::new(TypeSet::exact(ty), false)
    }

    /// Any object or null.
    pub fn any() -> Self {
        Self::new(TypeSet::Any, true)
    }

    /// Any object, never null.
    pub fn any_non_null() -> Self {
        Self::new(TypeSet::Any, false)
    }

    /// Only null.
    pub fn null() -> Self {
        Self::new(TypeSet::Empty, true)
    }

    /// No value at all.
    pub fn empty() -> Self {
        Self::new(TypeSet::Empty, false)
    }

    /// Attach a speculative exact type. Dropped if no value of the stamp can have it.
    pub fn with_speculation(mut self, ty: &TypeRef) -> Self {
        self.speculated = self.types.contains_instances_of(ty).then(|| ty.clone());
        self
    }

    /// Same stamp with null excluded.
    pub fn as_non_null(&self) -> Self {
        Self {
            may_be_null: false,
            ..self.clone()
        }
    }

    /// Same stamp with null allowed.
    pub fn as_nullable(&self) -> Self {
        Self {
            may_be_null: true,
            ..self.clone()
        }
    }

    pub fn types(&self) -> &TypeSet {
        &self.types
    }

    pub fn may_be_null(&self) -> bool {
        self.may_be_null
    }

    pub fn speculated(&self) -> Option<&TypeRef> {
        self.speculated.as_ref()
    }

    /// Nominal type of the stamp, if any.
    pub fn type_ref(&self) -> Option<&TypeRef> {
        self.types.type_ref()
    }

    pub fn is_exact_type(&self) -> bool {
        self.types.is_exact()
    }

    pub fn non_null(&self) -> bool {
        !self.may_be_null
    }

    /// Only null can flow here.
    pub fn always_null(&self) -> bool {
        self.types.is_empty() && self.may_be_null
    }

    /// Nothing can flow here.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && !self.may_be_null
    }

    /// Membership of a concrete runtime value: `None` is null, `Some(class)`
    /// an object whose exact class is `class`.
    pub fn contains_value(&self, value: Option<&TypeRef>) -> bool {
        match value {
            None => self.may_be_null,
            Some(class) => self.types.contains_instances_of(class),
        }
    }
}

/// Primitive value kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Int,
    Long,
    Float,
    Double,
}

/// Lattice value attached to every IR node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stamp {
    /// Reference values
    Object(ObjectStamp),
    /// Primitive values of one kind
    Primitive(PrimitiveKind),
    /// Nodes that produce no value (control, anchors)
    Void,
}

impl Stamp {
    pub fn boolean() -> Self {
        Stamp::Primitive(PrimitiveKind::Boolean)
    }

    pub fn as_object(&self) -> Option<&ObjectStamp> {
        match self {
            Stamp::Object(stamp) => Some(stamp),
            Stamp::Primitive(_) | Stamp::Void => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Stamp::Object(_))
    }

    /// Narrow an object stamp with extra knowledge; other stamps are unchanged.
    pub fn improve_with(&self, narrowing: &ObjectStamp) -> Stamp {
        match self {
            Stamp::Object(stamp) => Stamp::Object(stamp.join(narrowing)),
            other => other.clone(),
        }
    }
}

impl From<ObjectStamp> for Stamp {
    fn from(stamp: ObjectStamp) -> Self {
        Stamp::Object(stamp)
    }
}
