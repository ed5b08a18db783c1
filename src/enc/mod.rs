//! Incremental delta re-emission (Edit-and-Continue).
//!
//! A debugging session emits generation 0 as a full build, then applies
//! source edits as metadata/IL deltas against the running process. This
//! module owns everything that makes those deltas coherent across
//! generations:
//!
//! - [`EmitBaseline`] - the append-only ledger chain of emitted rows, heap
//!   sizes, local slots, and the committed anonymous-type map
//! - [`SemanticEdit`] - the symbol-level description of one change
//! - [`SymbolMatcher`] - structural matching across independently
//!   represented universes
//! - [`AnonymousTypeManager`] - the grow-only anonymous-type registry
//! - [`DeltaBuilder`] - the generation computation itself
//!
//! # Thread Safety
//!
//! A baseline is immutable once built and shared behind `Arc`; the
//! generation discipline (each baseline feeds exactly one successor) is
//! enforced with an atomic consumed flag, so concurrent misuse fails with
//! [`crate::Error::GenerationOrder`] instead of corrupting the chain.

mod anonymous;
mod baseline;
mod delta;
mod edits;
mod locals;
mod matcher;

pub use anonymous::{
    anonymous_type_name, anonymous_type_parameter_name, parse_anonymous_type_index,
    parse_anonymous_type_parameter, AnonymousTypeKey, AnonymousTypeManager, AnonymousTypeMap,
    AnonymousTypeValue,
};
pub use baseline::{
    field_ledger_key, method_ledger_key, type_ledger_key, EmitBaseline, HeapSizes,
};
pub use delta::{AddedRow, DeltaBuilder, DeltaResult, UpdatedMethod};
pub use edits::{PositionMapFn, SemanticEdit, SemanticEditKind};
pub use locals::{assign_slots, remap_slots, LocalSlot};
pub use matcher::SymbolMatcher;

use std::sync::Arc;

use crate::symbols::SymbolUniverse;

/// One live compilation participating in a delta chain: its symbol
/// universe plus the compilation-scoped anonymous-type registry.
pub struct Compilation {
    /// The compilation's symbol universe
    pub universe: Arc<SymbolUniverse>,
    anonymous_types: AnonymousTypeManager,
}

impl Compilation {
    /// Wraps a universe with an empty anonymous-type registry.
    #[must_use]
    pub fn new(universe: Arc<SymbolUniverse>) -> Self {
        Self {
            universe,
            anonymous_types: AnonymousTypeManager::new(),
        }
    }

    /// Wraps a universe, seeding the anonymous-type registry from the
    /// previous generation's committed map. Every compilation after
    /// generation 0 is constructed this way so indices stay aligned.
    #[must_use]
    pub fn resuming_from(universe: Arc<SymbolUniverse>, baseline: &EmitBaseline) -> Self {
        Self {
            universe,
            anonymous_types: AnonymousTypeManager::from_snapshot(baseline.anonymous_types()),
        }
    }

    /// The compilation's anonymous-type registry.
    #[must_use]
    pub fn anonymous_types(&self) -> &AnonymousTypeManager {
        &self.anonymous_types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{FieldSymbolBuilder, TypeSig, TypeSymbolBuilder};
    use uguid::Guid;

    #[test]
    fn test_resumed_compilation_inherits_indices() {
        let u0 = Arc::new(SymbolUniverse::new());
        let anon = TypeSymbolBuilder::new(&u0)
            .name("<>f__AnonymousType0")
            .type_parameter(anonymous_type_parameter_name("Name"))
            .anonymous()
            .build();
        let _ = FieldSymbolBuilder::new(&u0)
            .name("Name")
            .field_type(TypeSig::TypeParam { index: 0, method: false })
            .build(&anon);
        let baseline = EmitBaseline::initial(u0, Guid::ZERO);

        let u1 = Arc::new(SymbolUniverse::new());
        let compilation = Compilation::resuming_from(u1, &baseline);

        let existing = compilation
            .anonymous_types()
            .get_or_register(&AnonymousTypeKey::new(["Name"]));
        assert_eq!(existing.index, 0);

        let fresh = compilation
            .anonymous_types()
            .get_or_register(&AnonymousTypeKey::new(["Name", "Age"]));
        assert_eq!(fresh.index, 1);
    }
}
