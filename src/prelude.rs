//! Common imports for working with this crate.
//!
//! Brings the types most call sites need into scope in one line:
//!
//! ```rust
//! use cilemit::prelude::*;
//! ```

// Core result and error types
pub use crate::{Error, Result};

// Diagnostics and identity
pub use crate::metadata::diagnostics::{
    DiagnosticSeverity, EmitDiagnostic, EmitDiagnostics, EmitErrorCode, SourceLocation,
};
pub use crate::metadata::identity::{AssemblyContentType, AssemblyIdentity, AssemblyVersion};
pub use crate::metadata::token::{TableId, Token};

// Symbol model and builders
pub use crate::symbols::{
    build_assembly, AssemblyRc, AssemblySymbol, CustomModifierSym, EventRc, EventSymbol,
    FieldAttributes, FieldRc, FieldSymbol, FieldSymbolBuilder, LocalDefinition, MethodAttributes,
    MethodRc, MethodSymbol, MethodSymbolBuilder, ModuleRc, ModuleSymbol, ModuleSymbolBuilder,
    NamedTypeRc, NamedTypeSymbol, ParameterSymbol, PrimitiveKind, PropertyRc, PropertySymbol,
    SymbolId, SymbolKind, SymbolRef, SymbolUniverse, TypeAttributes, TypeHandle, TypeSig,
    TypeSymbolBuilder,
};

// Reference translation
pub use crate::emit::{
    EmitContext, IdentityResolver, MetadataRef, ModuleSerializationProperties,
    ReferenceTranslator, ResolutionScope,
};

// Edit-and-Continue
pub use crate::enc::{
    AnonymousTypeKey, AnonymousTypeManager, Compilation, DeltaBuilder, DeltaResult, EmitBaseline,
    LocalSlot, PositionMapFn, SemanticEdit, SemanticEditKind, SymbolMatcher,
};
