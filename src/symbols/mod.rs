//! The symbol-graph view consumed from the semantic-analysis layer.
//!
//! Semantic analysis owns the symbol graph; this crate only reads it. The
//! types here are the concrete, immutable capability surface that graph is
//! handed over as: reference-counted nodes with weak upward links (member to
//! container), append-only member lists, and per-universe symbol ids.
//!
//! Two universes of these symbols never share nodes. The Edit-and-Continue
//! layer compares a byte-decoded baseline universe against a live compilation
//! universe, so identity comparison across universes is meaningless by
//! construction and all cross-universe matching is structural
//! (see [`crate::enc::SymbolMatcher`]).
//!
//! # Key Components
//!
//! - [`SymbolUniverse`] - id allocation plus the top-level type index
//! - [`AssemblySymbol`] / [`ModuleSymbol`] - container identity symbols
//! - [`NamedTypeSymbol`] - type definitions, generic instances, and
//!   specialized nested types, with [`TypeHandle`] weak links
//! - [`MethodSymbol`] / [`FieldSymbol`] / [`PropertySymbol`] / [`EventSymbol`] -
//!   member symbols
//! - [`TypeSig`] - recursive, finite signature shapes (pointer, by-ref,
//!   array, generic parameter, custom-modified)
//! - [`TypeSymbolBuilder`] and friends - fluent construction used by the
//!   analysis layer and by tests
//!
//! # Examples
//!
//! ```rust
//! use cilemit::symbols::{SymbolUniverse, TypeSymbolBuilder, TypeSig, PrimitiveKind};
//! use std::sync::Arc;
//!
//! let universe = Arc::new(SymbolUniverse::new());
//! let list = TypeSymbolBuilder::new(&universe)
//!     .namespace("System.Collections.Generic")
//!     .name("List")
//!     .type_parameter("T")
//!     .build();
//!
//! let list_of_int = list.instantiate(&universe, vec![TypeSig::Primitive(PrimitiveKind::I4)]);
//! assert!(!list_of_int.is_definition());
//! assert_eq!(list_of_int.fully_qualified_name(), "System.Collections.Generic.List`1");
//! ```

mod assembly;
mod builder;
mod members;
mod types;
mod universe;

pub use assembly::{AssemblyRc, AssemblySymbol, ModuleRc, ModuleSymbol};
pub use builder::{
    build_assembly, FieldSymbolBuilder, MethodSymbolBuilder, ModuleSymbolBuilder,
    TypeSymbolBuilder,
};
pub use members::{
    EventRc, EventSymbol, FieldAttributes, FieldRc, FieldSymbol, LocalDefinition,
    MethodAttributes, MethodRc, MethodSymbol, ParameterSymbol, PropertyRc, PropertySymbol,
};
pub use types::{
    CustomModifierSym, NamedTypeRc, NamedTypeSymbol, PrimitiveKind, TypeAttributes, TypeHandle,
    TypeSig,
};
pub use universe::{SymbolId, SymbolUniverse};

use std::fmt;

/// Kind discriminant for heterogeneous symbol APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// An assembly symbol
    Assembly,
    /// A module symbol
    Module,
    /// A named type (definition, instance, or specialized nested type)
    NamedType,
    /// A method symbol
    Method,
    /// A field symbol
    Field,
    /// A property symbol
    Property,
    /// An event symbol
    Event,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Assembly => write!(f, "assembly"),
            SymbolKind::Module => write!(f, "module"),
            SymbolKind::NamedType => write!(f, "type"),
            SymbolKind::Method => write!(f, "method"),
            SymbolKind::Field => write!(f, "field"),
            SymbolKind::Property => write!(f, "property"),
            SymbolKind::Event => write!(f, "event"),
        }
    }
}

/// A resolved reference to any symbol kind.
///
/// Used where APIs accept or return heterogeneous symbols: semantic edits,
/// matcher results, and the top-level translation entry point.
#[derive(Clone)]
pub enum SymbolRef {
    /// An assembly symbol
    Assembly(AssemblyRc),
    /// A module symbol
    Module(ModuleRc),
    /// A named type symbol
    NamedType(NamedTypeRc),
    /// A method symbol
    Method(MethodRc),
    /// A field symbol
    Field(FieldRc),
    /// A property symbol
    Property(PropertyRc),
    /// An event symbol
    Event(EventRc),
}

impl SymbolRef {
    /// Returns the kind of the referenced symbol.
    #[must_use]
    pub fn kind(&self) -> SymbolKind {
        match self {
            SymbolRef::Assembly(_) => SymbolKind::Assembly,
            SymbolRef::Module(_) => SymbolKind::Module,
            SymbolRef::NamedType(_) => SymbolKind::NamedType,
            SymbolRef::Method(_) => SymbolKind::Method,
            SymbolRef::Field(_) => SymbolKind::Field,
            SymbolRef::Property(_) => SymbolKind::Property,
            SymbolRef::Event(_) => SymbolKind::Event,
        }
    }

    /// Returns the simple name of the referenced symbol.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            SymbolRef::Assembly(a) => &a.name,
            SymbolRef::Module(m) => &m.name,
            SymbolRef::NamedType(t) => &t.name,
            SymbolRef::Method(m) => &m.name,
            SymbolRef::Field(f) => &f.name,
            SymbolRef::Property(p) => &p.name,
            SymbolRef::Event(e) => &e.name,
        }
    }

    /// Returns the per-universe id of the referenced symbol.
    #[must_use]
    pub fn id(&self) -> SymbolId {
        match self {
            SymbolRef::Assembly(a) => a.id(),
            SymbolRef::Module(m) => m.id(),
            SymbolRef::NamedType(t) => t.id(),
            SymbolRef::Method(m) => m.id(),
            SymbolRef::Field(f) => f.id(),
            SymbolRef::Property(p) => p.id(),
            SymbolRef::Event(e) => e.id(),
        }
    }
}

impl fmt::Debug for SymbolRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolRef({} '{}')", self.kind(), self.name())
    }
}
