//! Symbol universe: id allocation and the top-level type index.
//!
//! A [`SymbolUniverse`] is the allocation and lookup root for one
//! independently represented view of a program: the live compilation's view,
//! or the view decoded from a previously emitted module's bytes. Symbol ids
//! are unique within one universe only; they key the translation memo cache
//! and are never compared across universes.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;

use crate::symbols::NamedTypeRc;

/// Per-universe unique symbol id.
///
/// Allocated from an atomic counter at symbol construction. Ids are opaque;
/// their only contract is uniqueness within the owning universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub(crate) u32);

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One independently represented symbol universe.
///
/// Holds the id counter and an index of registered type definitions by
/// fully-qualified metadata name. Generic instances and specialized nested
/// types receive ids from the universe but are not indexed; only definitions
/// are reachable by name.
///
/// # Thread Safety
///
/// Registration and lookup are lock-free ([`DashMap`] index, atomic id
/// counter); a universe can be shared across emit passes behind an `Arc`.
pub struct SymbolUniverse {
    next_id: AtomicU32,
    types: boxcar::Vec<NamedTypeRc>,
    by_fullname: DashMap<String, NamedTypeRc>,
}

impl Default for SymbolUniverse {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolUniverse {
    /// Creates a new empty universe.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU32::new(1),
            types: boxcar::Vec::new(),
            by_fullname: DashMap::new(),
        }
    }

    /// Allocates the next symbol id.
    pub(crate) fn allocate_id(&self) -> SymbolId {
        SymbolId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Registers a type definition in the by-name index.
    ///
    /// Called by the builders; instances are deliberately not registered.
    pub(crate) fn register_type(&self, ty: &NamedTypeRc) {
        self.types.push(ty.clone());
        self.by_fullname
            .insert(ty.fully_qualified_name(), ty.clone());
    }

    /// Looks up a type definition by fully-qualified metadata name.
    ///
    /// Nested types use `+` separators: `Ns.Outer`1+Inner`.
    #[must_use]
    pub fn get_by_fullname(&self, fullname: &str) -> Option<NamedTypeRc> {
        self.by_fullname.get(fullname).map(|e| e.value().clone())
    }

    /// Returns the number of registered type definitions.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.count()
    }

    /// Iterates over all registered type definitions in registration order.
    pub fn types(&self) -> impl Iterator<Item = &NamedTypeRc> {
        self.types.iter().map(|(_, t)| t)
    }
}

impl fmt::Debug for SymbolUniverse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolUniverse")
            .field("types", &self.types.count())
            .finish()
    }
}
