//! Assembly and module symbols.
//!
//! Assemblies own modules; modules link back to their containing assembly
//! through a weak reference to keep the container/member cycle collectable.
//! The identity resolver in [`crate::emit`] consults these symbols when
//! deciding resolution scopes and when suppressing a module's reference to
//! its own enclosing assembly.

use std::sync::{Arc, OnceLock, Weak};

use uguid::Guid;

use crate::{
    metadata::identity::AssemblyIdentity,
    symbols::{SymbolId, SymbolUniverse},
};

/// Reference-counted handle to an [`AssemblySymbol`]
pub type AssemblyRc = Arc<AssemblySymbol>;
/// Reference-counted handle to a [`ModuleSymbol`]
pub type ModuleRc = Arc<ModuleSymbol>;

/// An assembly symbol: the identity root of a set of modules.
pub struct AssemblySymbol {
    id: SymbolId,
    /// Simple assembly name
    pub name: String,
    /// The assembly's declared identity
    pub identity: AssemblyIdentity,
    /// Modules belonging to this assembly, primary module first
    pub modules: boxcar::Vec<ModuleRc>,
}

impl AssemblySymbol {
    /// Creates a new assembly symbol with no modules attached yet.
    #[must_use]
    pub fn new(universe: &SymbolUniverse, identity: AssemblyIdentity) -> AssemblyRc {
        Arc::new(Self {
            id: universe.allocate_id(),
            name: identity.name.clone(),
            identity,
            modules: boxcar::Vec::new(),
        })
    }

    /// Returns the per-universe symbol id.
    #[must_use]
    pub fn id(&self) -> SymbolId {
        self.id
    }

    /// Attaches a module to this assembly and links the module back.
    ///
    /// The back link is set exactly once; attaching the same module to two
    /// assemblies is a construction error on the analysis side.
    pub fn attach_module(self: &AssemblyRc, module: &ModuleRc) {
        self.modules.push(module.clone());
        let _ = module.containing_assembly.set(Arc::downgrade(self));
    }

    /// Returns the primary (first attached) module, if any.
    #[must_use]
    pub fn primary_module(&self) -> Option<ModuleRc> {
        self.modules.get(0).cloned()
    }
}

/// A module symbol: one physical metadata module.
///
/// A module may be standalone (netmodule) or owned by an assembly; the
/// containing-assembly link is populated by
/// [`AssemblySymbol::attach_module`] and stays empty for standalone modules.
pub struct ModuleSymbol {
    id: SymbolId,
    /// Module file name (e.g. `Widget.dll`)
    pub name: String,
    /// Persistent module version id
    pub mvid: Guid,
    pub(crate) containing_assembly: OnceLock<Weak<AssemblySymbol>>,
}

impl ModuleSymbol {
    /// Creates a new module symbol.
    #[must_use]
    pub fn new(universe: &SymbolUniverse, name: impl Into<String>, mvid: Guid) -> ModuleRc {
        Arc::new(Self {
            id: universe.allocate_id(),
            name: name.into(),
            mvid,
            containing_assembly: OnceLock::new(),
        })
    }

    /// Returns the per-universe symbol id.
    #[must_use]
    pub fn id(&self) -> SymbolId {
        self.id
    }

    /// Returns the declared containing assembly, or `None` for a standalone
    /// module (or one whose assembly has been dropped).
    #[must_use]
    pub fn containing_assembly(&self) -> Option<AssemblyRc> {
        self.containing_assembly.get().and_then(Weak::upgrade)
    }

    /// Returns true if no containing assembly was ever declared.
    #[must_use]
    pub fn is_standalone(&self) -> bool {
        self.containing_assembly.get().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::identity::AssemblyVersion;
    use uguid::guid;

    fn identity(name: &str) -> AssemblyIdentity {
        AssemblyIdentity::new(name, AssemblyVersion::new(1, 0, 0, 0), None, None)
    }

    #[test]
    fn test_attach_module_links_back() {
        let universe = SymbolUniverse::new();
        let assembly = AssemblySymbol::new(&universe, identity("Demo"));
        let module = ModuleSymbol::new(
            &universe,
            "Demo.dll",
            guid!("01234567-89ab-cdef-0123-456789abcdef"),
        );

        assembly.attach_module(&module);

        assert_eq!(assembly.primary_module().unwrap().id(), module.id());
        let back = module.containing_assembly().unwrap();
        assert_eq!(back.id(), assembly.id());
        assert!(!module.is_standalone());
    }

    #[test]
    fn test_standalone_module() {
        let universe = SymbolUniverse::new();
        let module = ModuleSymbol::new(
            &universe,
            "net.netmodule",
            guid!("00000000-0000-0000-0000-000000000001"),
        );

        assert!(module.is_standalone());
        assert!(module.containing_assembly().is_none());
    }
}
