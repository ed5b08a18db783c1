//! Per-pass emit context and serialization properties.
//!
//! One [`EmitContext`] lives for exactly one emit pass (or one delta
//! generation). It carries the identity of the module being built, the
//! diagnostics sink, the identity resolver, an optional source-location
//! hint used only for diagnostic attribution, and the serialization
//! properties the image packager consumes unchanged.

use std::sync::Arc;

use uguid::Guid;

use crate::{
    emit::IdentityResolver,
    metadata::diagnostics::{EmitDiagnostics, SourceLocation},
    symbols::{AssemblyRc, ModuleRc},
};

/// Properties passed through unchanged to the image packager.
///
/// This subsystem never interprets these; it only carries them alongside
/// the references it produces so the packager sees one coherent bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSerializationProperties {
    /// Physical file alignment of image sections
    pub file_alignment: u32,
    /// Target runtime version string (metadata root)
    pub target_runtime_version: String,
    /// Image requires a 32-bit process
    pub requires_32bit: bool,
    /// Image prefers 32-bit when both are possible
    pub prefers_32bit: bool,
    /// Image requires a 64-bit process
    pub requires_64bit: bool,
    /// Image contains only IL (no native code)
    pub il_only: bool,
    /// Persistent module version id, stable across deltas
    pub persistent_identifier: Guid,
    /// Preferred image base address
    pub base_address: u64,
    /// Heap reserve size
    pub size_of_heap_reserve: u64,
    /// Heap commit size
    pub size_of_heap_commit: u64,
    /// Stack reserve size
    pub size_of_stack_reserve: u64,
    /// Stack commit size
    pub size_of_stack_commit: u64,
}

impl Default for ModuleSerializationProperties {
    fn default() -> Self {
        Self {
            file_alignment: 0x200,
            target_runtime_version: "v4.0.30319".to_string(),
            requires_32bit: false,
            prefers_32bit: false,
            requires_64bit: false,
            il_only: true,
            persistent_identifier: Guid::ZERO,
            base_address: 0x0040_0000,
            size_of_heap_reserve: 0x0010_0000,
            size_of_heap_commit: 0x1000,
            size_of_stack_reserve: 0x0010_0000,
            size_of_stack_commit: 0x1000,
        }
    }
}

impl ModuleSerializationProperties {
    /// Sets the persistent module version id.
    #[must_use]
    pub fn with_persistent_identifier(mut self, id: Guid) -> Self {
        self.persistent_identifier = id;
        self
    }
}

/// State for one emit pass.
///
/// Single-threaded per pass: a driver that parallelizes independent passes
/// (a primary module and satellite modules, say) constructs one context per
/// pass. The diagnostics sink may be shared between contexts; it is the
/// only cross-cutting mutable resource and is lock-free.
pub struct EmitContext {
    module_name: String,
    source_assembly: Option<AssemblyRc>,
    diagnostics: Arc<EmitDiagnostics>,
    resolver: Arc<IdentityResolver>,
    location_hint: Option<SourceLocation>,
    serialization: ModuleSerializationProperties,
}

impl EmitContext {
    /// Creates a context for emitting the module called `module_name`.
    #[must_use]
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            source_assembly: None,
            diagnostics: Arc::new(EmitDiagnostics::new()),
            resolver: Arc::new(IdentityResolver::new()),
            location_hint: None,
            serialization: ModuleSerializationProperties::default(),
        }
    }

    /// Sets the assembly being built (used by the self-reference rule and
    /// resolution scopes).
    #[must_use]
    pub fn with_source_assembly(mut self, assembly: &AssemblyRc) -> Self {
        self.source_assembly = Some(assembly.clone());
        self
    }

    /// Shares an existing diagnostics sink (e.g. across satellite passes).
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<EmitDiagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Installs an identity resolver with override mappings.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<IdentityResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Sets the location hint used when an offending symbol has no
    /// location of its own.
    #[must_use]
    pub fn with_location_hint(mut self, hint: SourceLocation) -> Self {
        self.location_hint = Some(hint);
        self
    }

    /// Sets the serialization properties to pass through.
    #[must_use]
    pub fn with_serialization(mut self, serialization: ModuleSerializationProperties) -> Self {
        self.serialization = serialization;
        self
    }

    /// Name of the module being built.
    #[must_use]
    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// The assembly being built, if declared.
    #[must_use]
    pub fn source_assembly(&self) -> Option<&AssemblyRc> {
        self.source_assembly.as_ref()
    }

    /// The diagnostics sink for this pass.
    #[must_use]
    pub fn diagnostics(&self) -> &Arc<EmitDiagnostics> {
        &self.diagnostics
    }

    /// The identity resolver for this pass.
    #[must_use]
    pub fn resolver(&self) -> &Arc<IdentityResolver> {
        &self.resolver
    }

    /// The location hint, if set.
    #[must_use]
    pub fn location_hint(&self) -> Option<&SourceLocation> {
        self.location_hint.as_ref()
    }

    /// The serialization properties to pass through.
    #[must_use]
    pub fn serialization(&self) -> &ModuleSerializationProperties {
        &self.serialization
    }

    /// Returns true if `assembly` is reference-identical to the assembly
    /// being built.
    #[must_use]
    pub fn is_building_assembly(&self, assembly: &AssemblyRc) -> bool {
        self.source_assembly
            .as_ref()
            .is_some_and(|building| Arc::ptr_eq(building, assembly))
    }

    /// Returns true if `module` is the module being built (by name; the
    /// module symbol for the output does not exist until it is emitted).
    #[must_use]
    pub fn is_building_module(&self, module: &ModuleRc) -> bool {
        module.name == self.module_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::identity::{AssemblyIdentity, AssemblyVersion};
    use crate::symbols::{build_assembly, SymbolUniverse};

    #[test]
    fn test_default_serialization_properties() {
        let props = ModuleSerializationProperties::default();
        assert_eq!(props.file_alignment, 0x200);
        assert_eq!(props.target_runtime_version, "v4.0.30319");
        assert!(props.il_only);
        assert!(!props.requires_64bit);
    }

    #[test]
    fn test_context_builder_chain() {
        let universe = Arc::new(SymbolUniverse::new());
        let assembly = build_assembly(
            &universe,
            AssemblyIdentity::new("Demo", AssemblyVersion::new(1, 0, 0, 0), None, None),
        );

        let ctx = EmitContext::new("Demo.dll").with_source_assembly(&assembly);
        assert_eq!(ctx.module_name(), "Demo.dll");
        assert!(ctx.is_building_assembly(&assembly));

        let other = build_assembly(
            &universe,
            AssemblyIdentity::new("Other", AssemblyVersion::new(1, 0, 0, 0), None, None),
        );
        assert!(!ctx.is_building_assembly(&other));
    }
}
