//! Errors raised while building a type hierarchy.

use std::path::PathBuf;

use thiserror::Error;

/// Hierarchy definition error
///
/// Every variant describes a malformed declaration; the hierarchy is left
/// unchanged when one is returned.
#[derive(Debug, Error)]
pub enum HierarchyError {
    /// A type with this name already exists
    #[error("type {0} is already defined")]
    DuplicateType(String),

    /// A declaration refers to a type that was never declared
    #[error("unknown type {0}")]
    UnknownType(String),

    /// A class names an interface as its superclass
    #[error("class {class} cannot extend interface {parent}")]
    ExtendsInterface {
        /// Declared class
        class: String,
        /// Offending parent
        parent: String,
    },

    /// A class names a final class as its superclass
    #[error("class {class} cannot extend final class {parent}")]
    ExtendsFinal {
        /// Declared class
        class: String,
        /// Offending parent
        parent: String,
    },

    /// A class appears where only interfaces are allowed
    #[error("{ty} cannot implement class {parent}")]
    ImplementsClass {
        /// Declared type
        ty: String,
        /// Offending parent
        parent: String,
    },

    /// A class was declared both final and abstract
    #[error("class {0} cannot be both final and abstract")]
    FinalAbstract(String),

    /// Declarations that could not be ordered (they depend on each other)
    #[error("cyclic type declarations: {}", .0.join(", "))]
    Cycle(Vec<String>),

    /// Reading a hierarchy file failed
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML
    #[error("invalid hierarchy description: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for hierarchy operations
pub type HierarchyResult<T> = Result<T, HierarchyError>;
