//! The generation chain: what each emitted generation remembers.
//!
//! An [`EmitBaseline`] is the cumulative state a delta is computed against.
//! Ordinal 0 represents the full build (decoded from the module's bytes or
//! retained from the emitting compilation); each successful delta produces
//! the next baseline by extending the previous one's ledgers. Ledgers are
//! append-only: metadata rows are assigned once and never renumbered or
//! retired, heap offsets only grow, and the anonymous-type map only gains
//! entries.
//!
//! Ledger keys are the canonical structural keys from
//! [`crate::symbols`], so a row assigned by one generation is findable from
//! any later compilation's universe without node identity.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use uguid::Guid;

use crate::enc::anonymous::{AnonymousTypeManager, AnonymousTypeMap};
use crate::enc::locals::LocalSlot;
use crate::metadata::token::{TableId, Token};
use crate::symbols::{FieldRc, MethodRc, NamedTypeRc, SymbolUniverse};

/// Ledger key of a type definition.
#[must_use]
pub fn type_ledger_key(ty: &NamedTypeRc) -> String {
    ty.fully_qualified_name()
}

/// Ledger key of a method definition: container key plus signature key.
#[must_use]
pub fn method_ledger_key(method: &MethodRc) -> Option<String> {
    let container = method.containing_type.upgrade()?;
    Some(format!(
        "{}::{}",
        container.fully_qualified_name(),
        method.signature_key()
    ))
}

/// Ledger key of a field definition: container key plus signature key.
#[must_use]
pub fn field_ledger_key(field: &FieldRc) -> Option<String> {
    let container = field.containing_type.upgrade()?;
    Some(format!(
        "{}::{}",
        container.fully_qualified_name(),
        field.signature_key()
    ))
}

/// Sizes of the four metadata heaps at the end of a generation. Delta
/// heaps are pure appendices, so the next generation's offsets start here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapSizes {
    /// String heap length in bytes
    pub string_heap: u32,
    /// Blob heap length in bytes
    pub blob_heap: u32,
    /// Guid heap length in bytes
    pub guid_heap: u32,
    /// User-string heap length in bytes
    pub user_string_heap: u32,
}

/// Cumulative state of one emitted generation.
#[derive(Debug)]
pub struct EmitBaseline {
    ordinal: u32,
    module_id: Guid,
    generation_id: Guid,
    universe: Arc<SymbolUniverse>,
    pub(crate) type_rows: HashMap<String, u32>,
    pub(crate) method_rows: HashMap<String, u32>,
    pub(crate) field_rows: HashMap<String, u32>,
    pub(crate) property_rows: HashMap<String, u32>,
    pub(crate) event_rows: HashMap<String, u32>,
    pub(crate) table_row_counts: HashMap<TableId, u32>,
    pub(crate) heap_sizes: HeapSizes,
    pub(crate) local_slots: HashMap<String, Vec<LocalSlot>>,
    pub(crate) deleted_members: Vec<String>,
    anonymous_types: OnceLock<AnonymousTypeMap>,
    superseded: AtomicBool,
}

impl EmitBaseline {
    /// Creates the ordinal-0 baseline from the full build's universe.
    ///
    /// Rows are assigned in registration order, matching the order a table
    /// writer lays definitions out. The anonymous-type map is recovered
    /// lazily from the universe's type names on first use.
    #[must_use]
    pub fn initial(universe: Arc<SymbolUniverse>, module_id: Guid) -> Arc<Self> {
        let mut type_rows = HashMap::new();
        let mut method_rows = HashMap::new();
        let mut field_rows = HashMap::new();
        let mut local_slots = HashMap::new();

        for ty in universe.types() {
            let row = type_rows.len() as u32 + 1;
            type_rows.insert(type_ledger_key(ty), row);

            for (_, field) in ty.fields.iter() {
                if let Some(key) = field_ledger_key(field) {
                    let row = field_rows.len() as u32 + 1;
                    field_rows.insert(key, row);
                }
            }
            for (_, method) in ty.methods.iter() {
                if let Some(key) = method_ledger_key(method) {
                    let row = method_rows.len() as u32 + 1;
                    local_slots.insert(key.clone(), crate::enc::assign_slots(&method.locals));
                    method_rows.insert(key, row);
                }
            }
        }

        let table_row_counts = HashMap::from([
            (TableId::TypeDef, type_rows.len() as u32),
            (TableId::MethodDef, method_rows.len() as u32),
            (TableId::Field, field_rows.len() as u32),
            (TableId::PropertyMap, 0),
            (TableId::Property, 0),
            (TableId::EventMap, 0),
            (TableId::Event, 0),
        ]);

        Arc::new(Self {
            ordinal: 0,
            module_id,
            generation_id: module_id,
            universe,
            type_rows,
            method_rows,
            field_rows,
            property_rows: HashMap::new(),
            event_rows: HashMap::new(),
            table_row_counts,
            heap_sizes: HeapSizes::default(),
            local_slots,
            deleted_members: Vec::new(),
            anonymous_types: OnceLock::new(),
            superseded: AtomicBool::new(false),
        })
    }

    /// Sets the heap sizes the full build ended with. Only meaningful on the
    /// ordinal-0 baseline, before any delta is built against it.
    #[must_use]
    pub fn with_heap_sizes(self: Arc<Self>, heap_sizes: HeapSizes) -> Arc<Self> {
        let mut baseline = Arc::try_unwrap(self).unwrap_or_else(|shared| Self {
            ordinal: shared.ordinal,
            module_id: shared.module_id,
            generation_id: shared.generation_id,
            universe: shared.universe.clone(),
            type_rows: shared.type_rows.clone(),
            method_rows: shared.method_rows.clone(),
            field_rows: shared.field_rows.clone(),
            property_rows: shared.property_rows.clone(),
            event_rows: shared.event_rows.clone(),
            table_row_counts: shared.table_row_counts.clone(),
            heap_sizes: shared.heap_sizes,
            local_slots: shared.local_slots.clone(),
            deleted_members: shared.deleted_members.clone(),
            anonymous_types: OnceLock::new(),
            superseded: AtomicBool::new(shared.superseded.load(Ordering::Relaxed)),
        });
        baseline.heap_sizes = heap_sizes;
        Arc::new(baseline)
    }

    pub(crate) fn next_generation(
        previous: &Arc<Self>,
        universe: Arc<SymbolUniverse>,
        generation_id: Guid,
    ) -> Self {
        Self {
            ordinal: previous.ordinal + 1,
            module_id: previous.module_id,
            generation_id,
            universe,
            type_rows: previous.type_rows.clone(),
            method_rows: previous.method_rows.clone(),
            field_rows: previous.field_rows.clone(),
            property_rows: previous.property_rows.clone(),
            event_rows: previous.event_rows.clone(),
            table_row_counts: previous.table_row_counts.clone(),
            heap_sizes: previous.heap_sizes,
            local_slots: previous.local_slots.clone(),
            deleted_members: previous.deleted_members.clone(),
            anonymous_types: OnceLock::new(),
            superseded: AtomicBool::new(false),
        }
    }

    pub(crate) fn set_anonymous_types(&self, map: AnonymousTypeMap) {
        let _ = self.anonymous_types.set(map);
    }

    /// Generation number: 0 for the full build, N for the Nth delta.
    #[must_use]
    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// Returns true for the full-build baseline.
    #[must_use]
    pub fn is_initial(&self) -> bool {
        self.ordinal == 0
    }

    /// The module version id, constant across the whole chain.
    #[must_use]
    pub fn module_id(&self) -> Guid {
        self.module_id
    }

    /// The id of this particular generation.
    #[must_use]
    pub fn generation_id(&self) -> Guid {
        self.generation_id
    }

    /// The symbol universe this generation was built from.
    #[must_use]
    pub fn universe(&self) -> &Arc<SymbolUniverse> {
        &self.universe
    }

    /// The heap sizes this generation ended with.
    #[must_use]
    pub fn heap_sizes(&self) -> HeapSizes {
        self.heap_sizes
    }

    /// The row assigned to a type definition, as a token.
    #[must_use]
    pub fn type_token(&self, key: &str) -> Option<Token> {
        self.type_rows
            .get(key)
            .map(|&row| Token::from_parts(TableId::TypeDef, row))
    }

    /// The row assigned to a method definition, as a token.
    #[must_use]
    pub fn method_token(&self, key: &str) -> Option<Token> {
        self.method_rows
            .get(key)
            .map(|&row| Token::from_parts(TableId::MethodDef, row))
    }

    /// The row assigned to a field definition, as a token.
    #[must_use]
    pub fn field_token(&self, key: &str) -> Option<Token> {
        self.field_rows
            .get(key)
            .map(|&row| Token::from_parts(TableId::Field, row))
    }

    /// Cumulative row count of a table across all generations so far.
    #[must_use]
    pub fn table_row_count(&self, table: TableId) -> u32 {
        self.table_row_counts.get(&table).copied().unwrap_or(0)
    }

    /// The anonymous-type map this generation committed to, recovered from
    /// the universe's type names on first access for a decoded ordinal-0
    /// baseline.
    #[must_use]
    pub fn anonymous_types(&self) -> &AnonymousTypeMap {
        self.anonymous_types
            .get_or_init(|| AnonymousTypeManager::from_universe(&self.universe).snapshot())
    }

    /// The local slots the generation assigned for a method, by ledger key.
    #[must_use]
    pub fn local_slots_for(&self, method_key: &str) -> Option<&[LocalSlot]> {
        self.local_slots.get(method_key).map(Vec::as_slice)
    }

    /// Ledger keys of members deleted in some generation up to this one.
    /// Their rows remain allocated forever.
    #[must_use]
    pub fn deleted_members(&self) -> &[String] {
        &self.deleted_members
    }

    pub(crate) fn mark_superseded(&self) -> bool {
        !self.superseded.swap(true, Ordering::SeqCst)
    }

    pub(crate) fn is_superseded(&self) -> bool {
        self.superseded.load(Ordering::SeqCst)
    }
}
