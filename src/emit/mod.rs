//! Reference translation: from symbols to serializable reference shapes.
//!
//! This is the layer a table writer talks to. Given any symbol reachable
//! from a definition being emitted, the [`ReferenceTranslator`] classifies
//! it into exactly one variant of the closed [`MetadataRef`] union - the
//! in-memory shape carrying precisely the fields a table-based binary
//! metadata format needs to serialize the reference. The
//! [`IdentityResolver`] supplies assembly identities for anything that
//! crosses the module boundary, and the [`EmitContext`] carries the per-pass
//! state: the module being built, the diagnostics sink, serialization
//! properties, and an optional location hint for diagnostic attribution.
//!
//! # Classification
//!
//! Classification runs on two independent axes - "is this symbol itself a
//! generic instantiation" and "is its container a generic instantiation" -
//! applied per symbol kind. Every method symbol lands in exactly one of
//! four variants, every named type in one of six, every field in one of
//! two. Consumers `match` exhaustively; there is no defensive "as-X"
//! probing.
//!
//! # Key Components
//!
//! - [`MetadataRef`] - the closed reference union
//! - [`ReferenceTranslator`] - the classifier, with a per-pass memo cache
//! - [`IdentityResolver`] - assembly/module identity resolution
//! - [`EmitContext`] - per-pass state and configuration

mod context;
mod refs;
mod resolver;
mod translate;

pub use context::{EmitContext, ModuleSerializationProperties};
pub use refs::{
    AssemblyRefData, CallingConvention, CustomModifierData, FieldRefData, MetadataRef,
    MethodInstanceData, MethodRefData, ModifiedTypeData, ModuleRefData, NestedTypeData,
    ParamData, ResolutionScope, TypeDefData, TypeInstanceData,
};
pub use resolver::IdentityResolver;
pub use translate::ReferenceTranslator;
