//! Nominal type hierarchy.
//!
//! Types form a single-inheritance class tree rooted at `Object`, plus
//! interfaces that classes implement and other interfaces extend.
//!
//! ```text
//!              Object
//!             /      \
//!        Animal      Robot ·····> Pet
//!        /    \
//!      Dog    Cat ···········> Pet
//! ```
//!
//! `TypeRef` handles are cheap to clone and compare by identity, so two
//! hierarchies that happen to declare the same names never mix.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{HierarchyError, HierarchyResult};

/// Name of the root class every type is a subtype of.
pub const ROOT_TYPE_NAME: &str = "Object";

/// Whether a type is a class or an interface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
}

/// Modifiers of a class declaration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClassFlags {
    /// No subclasses may exist
    pub is_final: bool,
    /// No instance has exactly this type
    pub is_abstract: bool,
}

impl ClassFlags {
    pub const FINAL: ClassFlags = ClassFlags {
        is_final: true,
        is_abstract: false,
    };
    pub const ABSTRACT: ClassFlags = ClassFlags {
        is_final: false,
        is_abstract: true,
    };
}

#[derive(Debug)]
struct TypeDesc {
    name: String,
    kind: TypeKind,
    /// Superclass for classes; the root for interfaces; `None` only for the root.
    parent: Option<TypeRef>,
    interfaces: Vec<TypeRef>,
    flags: ClassFlags,
}

/// Shared handle to a declared type.
#[derive(Clone)]
pub struct TypeRef(Arc<TypeDesc>);

impl TypeRef {
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn kind(&self) -> TypeKind {
        self.0.kind
    }

    pub fn is_interface(&self) -> bool {
        self.0.kind == TypeKind::Interface
    }

    pub fn is_final(&self) -> bool {
        self.0.flags.is_final
    }

    /// Interfaces count as abstract.
    pub fn is_abstract(&self) -> bool {
        self.is_interface() || self.0.flags.is_abstract
    }

    pub fn is_root(&self) -> bool {
        self.0.parent.is_none()
    }

    /// Whether some value can have exactly this type.
    pub fn is_instantiable(&self) -> bool {
        !self.is_abstract()
    }

    /// Direct superclass. Interfaces and the root have none.
    pub fn superclass(&self) -> Option<&TypeRef> {
        if self.is_interface() {
            None
        } else {
            self.0.parent.as_ref()
        }
    }

    /// Directly implemented (classes) or extended (interfaces) interfaces.
    pub fn interfaces(&self) -> &[TypeRef] {
        &self.0.interfaces
    }

    /// This type followed by its parents up to and including the root.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// Subtype relation: `self <: other`.
    ///
    /// Reflexive, and every type is a subtype of the root.
    pub fn is_subtype_of(&self, other: &TypeRef) -> bool {
        if self == other || other.is_root() {
            return true;
        }
        if other.is_interface() {
            return self
                .ancestors()
                .any(|t| t.interfaces().iter().any(|i| i.extends_interface(other)));
        }
        self.ancestors().any(|t| t == other)
    }

    fn extends_interface(&self, iface: &TypeRef) -> bool {
        self == iface || self.interfaces().iter().any(|i| i.extends_interface(iface))
    }

    /// The most specific class both types are subtypes of.
    ///
    /// Interfaces have no unique least upper bound, so any pair involving
    /// an unrelated interface meets at the root.
    pub fn least_common_superclass(&self, other: &TypeRef) -> TypeRef {
        if self.is_subtype_of(other) {
            return other.clone();
        }
        if other.is_subtype_of(self) {
            return self.clone();
        }
        let mut last = self;
        for ancestor in self.ancestors() {
            if other.is_subtype_of(ancestor) {
                return ancestor.clone();
            }
            last = ancestor;
        }
        last.clone()
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state);
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeRef").field(&self.0.name).finish()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

/// Iterator returned by [`TypeRef::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    next: Option<&'a TypeRef>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a TypeRef;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.0.parent.as_ref();
        Some(current)
    }
}

// ============================================================================
// Hierarchy registry
// ============================================================================

/// Registry of all types known to a compilation.
#[derive(Debug, Clone)]
pub struct TypeHierarchy {
    root: TypeRef,
    types: HashMap<String, TypeRef>,
}

impl Default for TypeHierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeHierarchy {
    /// Create a hierarchy containing only the root class.
    pub fn new() -> Self {
        let root = TypeRef(Arc::new(TypeDesc {
            name: ROOT_TYPE_NAME.to_string(),
            kind: TypeKind::Class,
            parent: None,
            interfaces: Vec::new(),
            flags: ClassFlags::default(),
        }));
        let mut types = HashMap::new();
        types.insert(ROOT_TYPE_NAME.to_string(), root.clone());
        Self { root, types }
    }

    pub fn root(&self) -> &TypeRef {
        &self.root
    }

    pub fn get(&self, name: &str) -> Option<&TypeRef> {
        self.types.get(name)
    }

    /// Look up a type, failing with `UnknownType` if it is not declared.
    pub fn resolve(&self, name: &str) -> HierarchyResult<&TypeRef> {
        self.types
            .get(name)
            .ok_or_else(|| HierarchyError::UnknownType(name.to_string()))
    }

    /// Number of types including the root.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Always false: the root is always present.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// All declared types, sorted by name.
    pub fn types(&self) -> Vec<&TypeRef> {
        let mut all: Vec<&TypeRef> = self.types.values().collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        all
    }

    /// Declare a class. `superclass` defaults to the root.
    pub fn define_class(
        &mut self,
        name: &str,
        superclass: Option<&str>,
        interfaces: &[&str],
        flags: ClassFlags,
    ) -> HierarchyResult<TypeRef> {
        self.check_fresh(name)?;
        if flags.is_final && flags.is_abstract {
            return Err(HierarchyError::FinalAbstract(name.to_string()));
        }
        let parent = match superclass {
            Some(parent_name) => self.resolve(parent_name)?.clone(),
            None => self.root.clone(),
        };
        if parent.is_interface() {
            return Err(HierarchyError::ExtendsInterface {
                class: name.to_string(),
                parent: parent.name().to_string(),
            });
        }
        if parent.is_final() {
            return Err(HierarchyError::ExtendsFinal {
                class: name.to_string(),
                parent: parent.name().to_string(),
            });
        }
        let interfaces = self.resolve_interfaces(name, interfaces)?;
        Ok(self.insert(TypeDesc {
            name: name.to_string(),
            kind: TypeKind::Class,
            parent: Some(parent),
            interfaces,
            flags,
        }))
    }

    /// Declare an interface extending the given interfaces.
    pub fn define_interface(&mut self, name: &str, extends: &[&str]) -> HierarchyResult<TypeRef> {
        self.check_fresh(name)?;
        let interfaces = self.resolve_interfaces(name, extends)?;
        Ok(self.insert(TypeDesc {
            name: name.to_string(),
            kind: TypeKind::Interface,
            parent: Some(self.root.clone()),
            interfaces,
            flags: ClassFlags::default(),
        }))
    }

    fn check_fresh(&self, name: &str) -> HierarchyResult<()> {
        if self.types.contains_key(name) {
            return Err(HierarchyError::DuplicateType(name.to_string()));
        }
        Ok(())
    }

    fn resolve_interfaces(&self, ty: &str, names: &[&str]) -> HierarchyResult<Vec<TypeRef>> {
        names
            .iter()
            .map(|iface_name| {
                let iface = self.resolve(iface_name)?;
                if !iface.is_interface() {
                    return Err(HierarchyError::ImplementsClass {
                        ty: ty.to_string(),
                        parent: iface.name().to_string(),
                    });
                }
                Ok(iface.clone())
            })
            .collect()
    }

    fn insert(&mut self, desc: TypeDesc) -> TypeRef {
        let ty = TypeRef(Arc::new(desc));
        self.types.insert(ty.name().to_string(), ty.clone());
        ty
    }

    // ========================================================================
    // TOML loading
    // ========================================================================

    /// Build a hierarchy from a TOML description.
    ///
    /// ```toml
    /// [[types]]
    /// name = "Animal"
    /// abstract = true
    ///
    /// [[types]]
    /// name = "Dog"
    /// extends = "Animal"
    /// implements = ["Pet"]
    ///
    /// [[types]]
    /// name = "Pet"
    /// kind = "interface"
    /// ```
    ///
    /// Declarations may appear in any order.
    pub fn from_toml_str(source: &str) -> HierarchyResult<Self> {
        let parsed: HierarchyToml = toml::from_str(source)?;
        let mut hierarchy = Self::new();

        let mut seen = BTreeSet::new();
        for decl in &parsed.types {
            if hierarchy.types.contains_key(&decl.name) || !seen.insert(decl.name.as_str()) {
                return Err(HierarchyError::DuplicateType(decl.name.clone()));
            }
        }

        let mut pending: Vec<&TypeDecl> = parsed.types.iter().collect();
        while !pending.is_empty() {
            let (ready, blocked): (Vec<&TypeDecl>, Vec<&TypeDecl>) = pending
                .into_iter()
                .partition(|decl| decl.dependencies().all(|dep| hierarchy.types.contains_key(dep)));

            if ready.is_empty() {
                // Either a dependency is never declared, or declarations form a cycle.
                for decl in &blocked {
                    if let Some(missing) = decl
                        .dependencies()
                        .find(|dep| !seen.contains(dep) && !hierarchy.types.contains_key(*dep))
                    {
                        return Err(HierarchyError::UnknownType(missing.to_string()));
                    }
                }
                let mut names: Vec<String> = blocked.iter().map(|d| d.name.clone()).collect();
                names.sort();
                return Err(HierarchyError::Cycle(names));
            }

            for decl in ready {
                hierarchy.define(decl)?;
            }
            pending = blocked;
        }

        Ok(hierarchy)
    }

    /// Read and parse a TOML hierarchy file.
    pub fn load(path: &Path) -> HierarchyResult<Self> {
        let source = fs::read_to_string(path).map_err(|source| HierarchyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    fn define(&mut self, decl: &TypeDecl) -> HierarchyResult<TypeRef> {
        let implements: Vec<&str> = decl.implements.iter().map(String::as_str).collect();
        match decl.kind {
            TypeKind::Class => self.define_class(
                &decl.name,
                decl.extends.as_deref(),
                &implements,
                ClassFlags {
                    is_final: decl.is_final,
                    is_abstract: decl.is_abstract,
                },
            ),
            TypeKind::Interface => {
                let mut extends = implements;
                if let Some(parent) = decl.extends.as_deref() {
                    extends.push(parent);
                }
                self.define_interface(&decl.name, &extends)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct HierarchyToml {
    #[serde(default)]
    types: Vec<TypeDecl>,
}

#[derive(Debug, Deserialize)]
struct TypeDecl {
    name: String,
    #[serde(default)]
    kind: TypeKind,
    extends: Option<String>,
    #[serde(default)]
    implements: Vec<String>,
    #[serde(default, rename = "final")]
    is_final: bool,
    #[serde(default, rename = "abstract")]
    is_abstract: bool,
}

impl TypeDecl {
    fn dependencies(&self) -> impl Iterator<Item = &str> {
        self.extends
            .as_deref()
            .into_iter()
            .chain(self.implements.iter().map(String::as_str))
    }
}
