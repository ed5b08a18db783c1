//! Assembly identity resolution for cross-module references.
//!
//! The resolver answers one question: when a reference leaves the module
//! being built, what identity does the record carry? The default answer is
//! the referenced assembly's own declared identity; an installed override
//! lets a driver substitute identities (retargeting a reference assembly to
//! its runtime implementation, say) without touching the symbol graph.

use crate::emit::{AssemblyRefData, EmitContext};
use crate::metadata::identity::AssemblyIdentity;
use crate::symbols::{AssemblyRc, ModuleRc};
use crate::Result;

/// Signature of an installed identity override.
pub type IdentityOverrideFn = dyn Fn(&AssemblyRc) -> Option<AssemblyIdentity> + Send + Sync;

/// Resolves assembly identities for references that cross the module
/// boundary.
#[derive(Default)]
pub struct IdentityResolver {
    override_fn: Option<Box<IdentityOverrideFn>>,
}

impl IdentityResolver {
    /// Creates a resolver with no overrides; every assembly resolves to its
    /// declared identity.
    #[must_use]
    pub fn new() -> Self {
        Self { override_fn: None }
    }

    /// Creates a resolver with an override consulted before the declared
    /// identity. Returning `None` from the override falls back to the
    /// declared identity.
    ///
    /// An override keeping the assembly's simple name is a version
    /// redirect: its version must still satisfy bindings recorded against
    /// the declared one, and an incompatible redirect is ignored. An
    /// override naming a different assembly substitutes the identity
    /// wholesale.
    #[must_use]
    pub fn with_override(
        override_fn: impl Fn(&AssemblyRc) -> Option<AssemblyIdentity> + Send + Sync + 'static,
    ) -> Self {
        Self {
            override_fn: Some(Box::new(override_fn)),
        }
    }

    /// The identity a reference record for `assembly` carries.
    #[must_use]
    pub fn resolve_assembly_identity(&self, assembly: &AssemblyRc) -> AssemblyIdentity {
        if let Some(override_fn) = &self.override_fn {
            if let Some(identity) = override_fn(assembly) {
                if identity.name != assembly.identity.name
                    || identity.version.is_compatible_with(&assembly.identity.version)
                {
                    return identity;
                }
            }
        }
        assembly.identity.clone()
    }

    /// Builds the assembly-reference payload for `assembly`.
    #[must_use]
    pub fn resolve_assembly_ref(&self, assembly: &AssemblyRc) -> AssemblyRefData {
        AssemblyRefData {
            identity: self.resolve_assembly_identity(assembly),
        }
    }

    /// Resolves the assembly a reference into `module` must name, applying
    /// the self-reference rule: a module of the assembly being built never
    /// yields an assembly reference, so a type in a sibling module scopes to
    /// a module reference rather than to its own assembly. A standalone
    /// module has no assembly to name and resolves to `None` as well.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Invariant`] if the module declares a
    /// containing assembly that is no longer alive; graph ownership is the
    /// analysis layer's contract.
    pub fn resolve_containing_assembly(
        &self,
        module: &ModuleRc,
        ctx: &EmitContext,
    ) -> Result<Option<AssemblyRefData>> {
        if module.is_standalone() {
            return Ok(None);
        }
        let Some(assembly) = module.containing_assembly() else {
            return Err(invariant_error!(
                "containing assembly of module '{}' is no longer alive",
                module.name
            ));
        };
        if ctx.is_building_assembly(&assembly) {
            return Ok(None);
        }
        Ok(Some(self.resolve_assembly_ref(&assembly)))
    }
}
