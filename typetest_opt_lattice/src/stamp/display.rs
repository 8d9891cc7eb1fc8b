//! Display formatting for stamps.
//!
//! Object stamps print as `a`, followed by `!` when null is excluded and `#`
//! when the type is exact, then the nominal type (`*` for any object):
//!
//! ```text
//! a! Dog      non-null Dog or subclass
//! a# Cat      exactly Cat, or null
//! a *         any object, or null
//! null        only null
//! empty       no value
//! ```
//!
//! A speculative type is appended as `~Name`.

use std::fmt;

use super::types::{ObjectStamp, PrimitiveKind, Stamp, TypeSet};

impl fmt::Display for ObjectStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("empty");
        }
        if self.always_null() {
            return f.write_str("null");
        }
        f.write_str("a")?;
        if self.non_null() {
            f.write_str("!")?;
        }
        if self.is_exact_type() {
            f.write_str("#")?;
        }
        match self.type_ref() {
            Some(ty) => write!(f, " {}", ty)?,
            None => f.write_str(" *")?,
        }
        if let Some(speculated) = self.speculated() {
            write!(f, " ~{}", speculated)?;
        }
        Ok(())
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSet::Empty => f.write_str("{}"),
            TypeSet::Any => f.write_str("*"),
            TypeSet::Subtypes(ty) => write!(f, "<: {}", ty),
            TypeSet::Exact(ty) => write!(f, "== {}", ty),
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stamp::Object(stamp) => fmt::Display::fmt(stamp, f),
            Stamp::Primitive(kind) => fmt::Display::fmt(kind, f),
            Stamp::Void => f.write_str("void"),
        }
    }
}
