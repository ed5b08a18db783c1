//! Building one delta generation from a baseline plus semantic edits.
//!
//! [`DeltaBuilder::build_generation`] is the top-level Edit-and-Continue
//! operation: it checks the generation discipline, enforces the
//! anonymous-type and embedded-interop rules, resolves each edit against
//! the baseline through the structural matcher, assigns metadata rows and
//! classifies every inserted or updated definition into its reference
//! shape, remaps local slots for preserved method bodies, and hands back
//! the delta description together with the next baseline in the chain.
//!
//! A failed or skipped edit becomes a diagnostic, never an abort; only a
//! malformed edit shape or a broken generation sequence returns `Err`.

use std::collections::HashMap;
use std::sync::Arc;

use uguid::Guid;

use crate::emit::{EmitContext, MetadataRef, ReferenceTranslator};
use crate::enc::baseline::{field_ledger_key, method_ledger_key, type_ledger_key, EmitBaseline};
use crate::enc::locals::{assign_slots, remap_slots, LocalSlot};
use crate::enc::matcher::SymbolMatcher;
use crate::enc::{Compilation, SemanticEdit, SemanticEditKind};
use crate::metadata::diagnostics::EmitErrorCode;
use crate::metadata::token::{TableId, Token};
use crate::symbols::{EventRc, NamedTypeRc, PropertyRc, SymbolRef};
use crate::{Error, Result};

/// One row assigned to a definition added in this generation.
#[derive(Debug, Clone, PartialEq)]
pub struct AddedRow {
    /// Ledger key of the definition
    pub key: String,
    /// The assigned metadata token
    pub token: Token,
    /// The classified reference shape of the definition. `None` for
    /// property and event rows (accessors carry the referenceable shapes)
    /// and for definitions whose translation failed with a diagnostic.
    pub reference: Option<MetadataRef>,
}

/// One method whose body is re-emitted in this generation.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatedMethod {
    /// Ledger key of the method
    pub key: String,
    /// The method's existing token, unchanged since it was first assigned
    pub token: Token,
    /// The classified reference shape of the method, `None` if translation
    /// failed with a diagnostic
    pub reference: Option<MetadataRef>,
    /// The local slots the new body uses
    pub locals: Vec<LocalSlot>,
}

/// The description of one delta generation, consumed by the table writer.
#[derive(Debug)]
pub struct DeltaResult {
    /// Ordinal of the generation this delta produces
    pub ordinal: u32,
    /// Id of the generation
    pub generation_id: Guid,
    /// Types added, with their freshly assigned rows
    pub added_types: Vec<AddedRow>,
    /// Methods added, with their freshly assigned rows
    pub added_methods: Vec<AddedRow>,
    /// Fields added, with their freshly assigned rows
    pub added_fields: Vec<AddedRow>,
    /// Properties added, with their freshly assigned rows
    pub added_properties: Vec<AddedRow>,
    /// Events added, with their freshly assigned rows
    pub added_events: Vec<AddedRow>,
    /// Types whose definition rows are touched by an update
    pub updated_types: Vec<AddedRow>,
    /// Methods whose bodies are re-emitted
    pub updated_methods: Vec<UpdatedMethod>,
    /// Fields touched by an update
    pub updated_fields: Vec<AddedRow>,
    /// Ledger keys newly recorded as deleted (rows stay allocated)
    pub deleted_members: Vec<String>,
}

impl Default for DeltaResult {
    fn default() -> Self {
        Self {
            ordinal: 0,
            generation_id: Guid::ZERO,
            added_types: Vec::new(),
            added_methods: Vec::new(),
            added_fields: Vec::new(),
            added_properties: Vec::new(),
            added_events: Vec::new(),
            updated_types: Vec::new(),
            updated_methods: Vec::new(),
            updated_fields: Vec::new(),
            deleted_members: Vec::new(),
        }
    }
}

/// Builds one delta generation.
pub struct DeltaBuilder {
    baseline: Arc<EmitBaseline>,
    compilation: Arc<Compilation>,
    edits: Vec<SemanticEdit>,
    generation_id: Guid,
}

impl DeltaBuilder {
    /// Creates a builder for the generation following `baseline`.
    #[must_use]
    pub fn new(
        baseline: Arc<EmitBaseline>,
        compilation: Arc<Compilation>,
        edits: Vec<SemanticEdit>,
    ) -> Self {
        Self {
            baseline,
            compilation,
            edits,
            generation_id: Guid::ZERO,
        }
    }

    /// Sets the id the produced generation carries.
    #[must_use]
    pub fn with_generation_id(mut self, generation_id: Guid) -> Self {
        self.generation_id = generation_id;
        self
    }

    /// Runs the delta computation.
    ///
    /// Returns the delta description and the next baseline; the consumed
    /// baseline is marked superseded, so at most one generation can ever be
    /// built on top of it.
    pub fn build_generation(
        self,
        ctx: &EmitContext,
    ) -> Result<(DeltaResult, Arc<EmitBaseline>)> {
        if self.baseline.is_superseded() {
            return Err(Error::GenerationOrder(format!(
                "baseline ordinal {} has already produced a successor",
                self.baseline.ordinal()
            )));
        }

        self.check_anonymous_types(ctx);

        let matcher = if self.baseline.ordinal() == 0 {
            SymbolMatcher::against_baseline(&self.baseline)
        } else {
            SymbolMatcher::against_previous_generation(&self.baseline)
        };
        // One translator per generation: every row this delta hands to the
        // table writer carries the reference shape the writer serializes.
        let translator = ReferenceTranslator::new();
        let mut next = EmitBaseline::next_generation(
            &self.baseline,
            self.compilation.universe.clone(),
            self.generation_id,
        );
        let mut result = DeltaResult {
            ordinal: self.baseline.ordinal() + 1,
            generation_id: self.generation_id,
            ..DeltaResult::default()
        };

        for edit in &self.edits {
            edit.validate()?;
            match edit.kind {
                SemanticEditKind::Insert => {
                    self.apply_insert(edit, &translator, &mut next, &mut result, ctx);
                }
                SemanticEditKind::Update => {
                    self.apply_update(edit, &matcher, &translator, &mut next, &mut result, ctx);
                }
                SemanticEditKind::Delete => {
                    self.apply_delete(edit, &mut next, &mut result, ctx);
                }
            }
        }

        next.set_anonymous_types(self.compilation.anonymous_types().snapshot());

        if !self.baseline.mark_superseded() {
            return Err(Error::GenerationOrder(format!(
                "baseline ordinal {} was consumed concurrently",
                self.baseline.ordinal()
            )));
        }
        Ok((result, Arc::new(next)))
    }

    /// The live registry must contain every association the baseline
    /// committed to, with identical indices. A shrunken or renumbered map is
    /// an analysis-layer defect; release builds report it and keep going so
    /// the debugging session survives.
    fn check_anonymous_types(&self, ctx: &EmitContext) {
        let committed = self.baseline.anonymous_types();
        let live = self.compilation.anonymous_types();
        if live.is_superset_of(committed) {
            return;
        }
        debug_assert!(
            false,
            "anonymous-type map lost associations committed by generation {}",
            self.baseline.ordinal()
        );
        ctx.diagnostics().error(
            EmitErrorCode::EncAnonymousTypeMapRegression,
            format!(
                "anonymous-type map lost associations committed by generation {}",
                self.baseline.ordinal()
            ),
            ctx.location_hint().cloned(),
        );
    }

    fn apply_insert(
        &self,
        edit: &SemanticEdit,
        translator: &ReferenceTranslator,
        next: &mut EmitBaseline,
        result: &mut DeltaResult,
        ctx: &EmitContext,
    ) {
        let symbol = edit.new_symbol.as_ref().expect("validated insert");
        match symbol {
            SymbolRef::NamedType(ty) => self.insert_type(ty, translator, next, result, ctx),
            SymbolRef::Method(method) => {
                let Some(key) = method_ledger_key(method) else {
                    self.unsupported(ctx, "method insert with a dropped container");
                    return;
                };
                if next.method_rows.contains_key(&key) {
                    self.unsupported(ctx, &format!("insert of existing method '{key}'"));
                    return;
                }
                let token = Self::allocate(next, TableId::MethodDef, &key);
                next.method_rows.insert(key.clone(), token.row());
                next.local_slots
                    .insert(key.clone(), assign_slots(&method.locals));
                let reference = translator.translate_method(method, ctx).ok();
                result.added_methods.push(AddedRow { key, token, reference });
            }
            SymbolRef::Field(field) => {
                let Some(key) = field_ledger_key(field) else {
                    self.unsupported(ctx, "field insert with a dropped container");
                    return;
                };
                if next.field_rows.contains_key(&key) {
                    self.unsupported(ctx, &format!("insert of existing field '{key}'"));
                    return;
                }
                let token = Self::allocate(next, TableId::Field, &key);
                next.field_rows.insert(key.clone(), token.row());
                let reference = translator.translate_field(field, ctx).ok();
                result.added_fields.push(AddedRow { key, token, reference });
            }
            SymbolRef::Property(property) => {
                let Some(key) = property_ledger_key(property) else {
                    self.unsupported(ctx, "property insert with a dropped container");
                    return;
                };
                // The first property on a type also costs a map row tying
                // the type to its property list.
                if Self::first_member_for_container(&next.property_rows, &key) {
                    let _ = Self::allocate(next, TableId::PropertyMap, &key);
                }
                let token = Self::allocate(next, TableId::Property, &key);
                next.property_rows.insert(key.clone(), token.row());
                result.added_properties.push(AddedRow { key, token, reference: None });
            }
            SymbolRef::Event(event) => {
                let Some(key) = event_ledger_key(event) else {
                    self.unsupported(ctx, "event insert with a dropped container");
                    return;
                };
                if Self::first_member_for_container(&next.event_rows, &key) {
                    let _ = Self::allocate(next, TableId::EventMap, &key);
                }
                let token = Self::allocate(next, TableId::Event, &key);
                next.event_rows.insert(key.clone(), token.row());
                result.added_events.push(AddedRow { key, token, reference: None });
            }
            SymbolRef::Assembly(_) | SymbolRef::Module(_) => {
                self.unsupported(ctx, "assembly and module symbols cannot be inserted");
            }
        }
    }

    fn insert_type(
        &self,
        ty: &NamedTypeRc,
        translator: &ReferenceTranslator,
        next: &mut EmitBaseline,
        result: &mut DeltaResult,
        ctx: &EmitContext,
    ) {
        if !ty.is_definition() {
            self.unsupported(ctx, "insert edits name definitions, not instantiations");
            return;
        }
        if ty.is_embedded_interop {
            ctx.diagnostics().error(
                EmitErrorCode::EncNoPiaTypeAdded,
                format!(
                    "embedded interop type '{}' cannot be added after the initial build",
                    ty.fully_qualified_name()
                ),
                ctx.location_hint().cloned(),
            );
            return;
        }
        let key = type_ledger_key(ty);
        if next.type_rows.contains_key(&key) {
            self.unsupported(ctx, &format!("insert of existing type '{key}'"));
            return;
        }

        let token = Self::allocate(next, TableId::TypeDef, &key);
        next.type_rows.insert(key.clone(), token.row());
        let reference = translator.translate_type(ty, ctx).ok();
        result.added_types.push(AddedRow { key, token, reference });

        // Inserting a type inserts everything it declares.
        for (_, field) in ty.fields.iter() {
            if let Some(key) = field_ledger_key(field) {
                let token = Self::allocate(next, TableId::Field, &key);
                next.field_rows.insert(key.clone(), token.row());
                let reference = translator.translate_field(field, ctx).ok();
                result.added_fields.push(AddedRow { key, token, reference });
            }
        }
        for (_, method) in ty.methods.iter() {
            if let Some(key) = method_ledger_key(method) {
                let token = Self::allocate(next, TableId::MethodDef, &key);
                next.method_rows.insert(key.clone(), token.row());
                next.local_slots
                    .insert(key.clone(), assign_slots(&method.locals));
                let reference = translator.translate_method(method, ctx).ok();
                result.added_methods.push(AddedRow { key, token, reference });
            }
        }
    }

    fn apply_update(
        &self,
        edit: &SemanticEdit,
        matcher: &SymbolMatcher,
        translator: &ReferenceTranslator,
        next: &mut EmitBaseline,
        result: &mut DeltaResult,
        ctx: &EmitContext,
    ) {
        let new_symbol = edit.new_symbol.as_ref().expect("validated update");

        // The matcher decides whether the previous generation has a
        // structural counterpart at all; the ledger then supplies its row.
        let Some(_counterpart) = matcher.map_symbol(new_symbol) else {
            self.update_miss(new_symbol, ctx);
            return;
        };

        match new_symbol {
            SymbolRef::NamedType(ty) => {
                let key = type_ledger_key(ty);
                let Some(token) = self.baseline.type_token(&key) else {
                    self.update_miss(new_symbol, ctx);
                    return;
                };
                let reference = translator.translate_type(ty, ctx).ok();
                result.updated_types.push(AddedRow { key, token, reference });
            }
            SymbolRef::Method(method) => {
                let Some(key) = method_ledger_key(method) else {
                    self.update_miss(new_symbol, ctx);
                    return;
                };
                let Some(token) = self.baseline.method_token(&key) else {
                    self.update_miss(new_symbol, ctx);
                    return;
                };

                let locals = match (&edit.syntax_map, edit.preserve_local_variables) {
                    (Some(syntax_map), true) => {
                        let previous = self.baseline.local_slots_for(&key).unwrap_or(&[]);
                        remap_slots(previous, &method.locals, syntax_map)
                    }
                    _ => assign_slots(&method.locals),
                };
                next.local_slots.insert(key.clone(), locals.clone());
                let reference = translator.translate_method(method, ctx).ok();
                result
                    .updated_methods
                    .push(UpdatedMethod { key, token, reference, locals });
            }
            SymbolRef::Field(field) => {
                let Some(key) = field_ledger_key(field) else {
                    self.update_miss(new_symbol, ctx);
                    return;
                };
                let Some(token) = self.baseline.field_token(&key) else {
                    self.update_miss(new_symbol, ctx);
                    return;
                };
                let reference = translator.translate_field(field, ctx).ok();
                result.updated_fields.push(AddedRow { key, token, reference });
            }
            SymbolRef::Property(_) | SymbolRef::Event(_) => {
                // Accessor bodies arrive as method updates; the property or
                // event row itself has nothing to re-emit.
            }
            SymbolRef::Assembly(_) | SymbolRef::Module(_) => {
                self.unsupported(ctx, "assembly and module symbols cannot be updated");
            }
        }
    }

    fn apply_delete(
        &self,
        edit: &SemanticEdit,
        next: &mut EmitBaseline,
        result: &mut DeltaResult,
        ctx: &EmitContext,
    ) {
        let old_symbol = edit.old_symbol.as_ref().expect("validated delete");
        let key = match old_symbol {
            SymbolRef::NamedType(ty) => Some(type_ledger_key(ty)),
            SymbolRef::Method(method) => method_ledger_key(method),
            SymbolRef::Field(field) => field_ledger_key(field),
            SymbolRef::Property(property) => property_ledger_key(property),
            SymbolRef::Event(event) => event_ledger_key(event),
            SymbolRef::Assembly(_) | SymbolRef::Module(_) => None,
        };
        let Some(key) = key else {
            self.unsupported(ctx, "this symbol kind cannot be deleted");
            return;
        };

        let known = match old_symbol {
            SymbolRef::NamedType(_) => next.type_rows.contains_key(&key),
            SymbolRef::Method(_) => next.method_rows.contains_key(&key),
            SymbolRef::Field(_) => next.field_rows.contains_key(&key),
            SymbolRef::Property(_) => next.property_rows.contains_key(&key),
            SymbolRef::Event(_) => next.event_rows.contains_key(&key),
            _ => false,
        };
        if !known {
            ctx.diagnostics().error(
                EmitErrorCode::EncUpdateFailedMissingSymbol,
                format!("delete names '{key}', which no generation has emitted"),
                ctx.location_hint().cloned(),
            );
            return;
        }

        // Rows are never retired; the member is only recorded as deleted.
        next.deleted_members.push(key.clone());
        result.deleted_members.push(key);
    }

    /// Ledger keys are `container::member`; a container with no row yet in
    /// `rows` is gaining its first member of this kind.
    fn first_member_for_container(rows: &HashMap<String, u32>, key: &str) -> bool {
        let container = key.split_once("::").map_or(key, |(container, _)| container);
        !rows
            .keys()
            .any(|existing| existing.split_once("::").is_some_and(|(c, _)| c == container))
    }

    fn allocate(next: &mut EmitBaseline, table: TableId, _key: &str) -> Token {
        let count = next.table_row_counts.entry(table).or_insert(0);
        *count += 1;
        Token::from_parts(table, *count)
    }

    fn update_miss(&self, symbol: &SymbolRef, ctx: &EmitContext) {
        ctx.diagnostics().error(
            EmitErrorCode::EncUpdateFailedMissingSymbol,
            format!(
                "update names {} '{}', which has no counterpart in generation {}",
                symbol.kind(),
                symbol.name(),
                self.baseline.ordinal()
            ),
            ctx.location_hint().cloned(),
        );
    }

    fn unsupported(&self, ctx: &EmitContext, message: &str) {
        ctx.diagnostics().error(
            EmitErrorCode::EncEditNotSupported,
            message,
            ctx.location_hint().cloned(),
        );
    }
}

fn property_ledger_key(property: &PropertyRc) -> Option<String> {
    let container = property.containing_type.upgrade()?;
    Some(format!(
        "{}::{}",
        container.fully_qualified_name(),
        property.name
    ))
}

fn event_ledger_key(event: &EventRc) -> Option<String> {
    let container = event.containing_type.upgrade()?;
    Some(format!(
        "{}::{}",
        container.fully_qualified_name(),
        event.name
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{
        MethodSymbolBuilder, PrimitiveKind, SymbolUniverse, TypeSig, TypeSymbolBuilder,
    };

    fn baseline_with_widget() -> (Arc<EmitBaseline>, Arc<SymbolUniverse>) {
        let u = Arc::new(SymbolUniverse::new());
        let widget = TypeSymbolBuilder::new(&u).namespace("Demo").name("Widget").build();
        let _ = MethodSymbolBuilder::new(&u)
            .name("Render")
            .returns(TypeSig::Primitive(PrimitiveKind::Void))
            .build(&widget);
        let baseline = EmitBaseline::initial(u.clone(), Guid::ZERO);
        (baseline, u)
    }

    fn live_compilation_like(universe: &Arc<SymbolUniverse>) -> Arc<Compilation> {
        // A fresh universe mirroring the baseline's shape.
        let _ = universe;
        let u = Arc::new(SymbolUniverse::new());
        let widget = TypeSymbolBuilder::new(&u).namespace("Demo").name("Widget").build();
        let _ = MethodSymbolBuilder::new(&u)
            .name("Render")
            .returns(TypeSig::Primitive(PrimitiveKind::Void))
            .build(&widget);
        Arc::new(Compilation::new(u))
    }

    #[test]
    fn test_update_reuses_existing_row() {
        let (baseline, old_u) = baseline_with_widget();
        let compilation = live_compilation_like(&old_u);
        let widget = compilation.universe.get_by_fullname("Demo.Widget").unwrap();
        let render = widget.find_method("Render").unwrap();

        let old_widget = old_u.get_by_fullname("Demo.Widget").unwrap();
        let old_render = old_widget.find_method("Render").unwrap();

        let edits = vec![SemanticEdit::update(
            SymbolRef::Method(old_render),
            SymbolRef::Method(render),
        )];
        let ctx = EmitContext::new("Demo.dll");
        let (delta, next) = DeltaBuilder::new(baseline.clone(), compilation, edits)
            .build_generation(&ctx)
            .unwrap();

        assert_eq!(delta.ordinal, 1);
        assert_eq!(delta.updated_methods.len(), 1);
        assert_eq!(
            delta.updated_methods[0].token,
            baseline
                .method_token("Demo.Widget::Render`0():System.Void")
                .unwrap()
        );
        assert!(matches!(
            delta.updated_methods[0].reference,
            Some(MetadataRef::Method(_))
        ));
        assert_eq!(next.ordinal(), 1);
        assert!(!ctx.diagnostics().has_errors());
    }

    #[test]
    fn test_insert_assigns_rows_past_baseline() {
        let (baseline, old_u) = baseline_with_widget();
        let compilation = live_compilation_like(&old_u);
        let gadget = TypeSymbolBuilder::new(&compilation.universe)
            .namespace("Demo")
            .name("Gadget")
            .build();
        let _ = MethodSymbolBuilder::new(&compilation.universe)
            .name("Spin")
            .returns(TypeSig::Primitive(PrimitiveKind::Void))
            .build(&gadget);

        let edits = vec![SemanticEdit::insert(SymbolRef::NamedType(gadget))];
        let ctx = EmitContext::new("Demo.dll");
        let (delta, next) = DeltaBuilder::new(baseline, compilation, edits)
            .build_generation(&ctx)
            .unwrap();

        assert_eq!(delta.added_types.len(), 1);
        assert_eq!(delta.added_types[0].token.row(), 2);
        assert_eq!(delta.added_methods.len(), 1);
        assert_eq!(delta.added_methods[0].token.row(), 2);
        assert_eq!(next.table_row_count(TableId::TypeDef), 2);

        // Every row hands the table writer its classified reference shape.
        assert!(matches!(
            delta.added_types[0].reference,
            Some(MetadataRef::NamespaceTypeDef(_))
        ));
        assert!(matches!(
            delta.added_methods[0].reference,
            Some(MetadataRef::Method(_))
        ));
    }

    #[test]
    fn test_nopia_insert_rejected() {
        let (baseline, old_u) = baseline_with_widget();
        let compilation = live_compilation_like(&old_u);
        let interop = TypeSymbolBuilder::new(&compilation.universe)
            .namespace("Interop")
            .name("IAccessible")
            .embedded_interop()
            .build();

        let edits = vec![SemanticEdit::insert(SymbolRef::NamedType(interop))];
        let ctx = EmitContext::new("Demo.dll");
        let (delta, _next) = DeltaBuilder::new(baseline, compilation, edits)
            .build_generation(&ctx)
            .unwrap();

        assert!(delta.added_types.is_empty());
        assert_eq!(
            ctx.diagnostics()
                .by_code(EmitErrorCode::EncNoPiaTypeAdded)
                .len(),
            1
        );
    }

    #[test]
    fn test_update_missing_counterpart_reports_and_skips() {
        let (baseline, old_u) = baseline_with_widget();
        let compilation = live_compilation_like(&old_u);
        let fresh = TypeSymbolBuilder::new(&compilation.universe)
            .namespace("Demo")
            .name("Fresh")
            .build();

        let edits = vec![SemanticEdit::update(
            SymbolRef::NamedType(fresh.clone()),
            SymbolRef::NamedType(fresh),
        )];
        let ctx = EmitContext::new("Demo.dll");
        let (delta, _next) = DeltaBuilder::new(baseline, compilation, edits)
            .build_generation(&ctx)
            .unwrap();

        assert!(delta.updated_types.is_empty());
        assert_eq!(
            ctx.diagnostics()
                .by_code(EmitErrorCode::EncUpdateFailedMissingSymbol)
                .len(),
            1
        );
    }

    #[test]
    fn test_delete_records_without_retiring() {
        let (baseline, old_u) = baseline_with_widget();
        let compilation = live_compilation_like(&old_u);
        let old_widget = old_u.get_by_fullname("Demo.Widget").unwrap();
        let old_render = old_widget.find_method("Render").unwrap();

        let edits = vec![SemanticEdit::delete(SymbolRef::Method(old_render))];
        let ctx = EmitContext::new("Demo.dll");
        let (delta, next) = DeltaBuilder::new(baseline, compilation, edits)
            .build_generation(&ctx)
            .unwrap();

        assert_eq!(delta.deleted_members, vec![
            "Demo.Widget::Render`0():System.Void".to_string()
        ]);
        // The row stays allocated.
        assert!(next
            .method_token("Demo.Widget::Render`0():System.Void")
            .is_some());
        assert_eq!(next.table_row_count(TableId::MethodDef), 1);
    }

    #[test]
    fn test_consumed_baseline_rejects_second_delta() {
        let (baseline, old_u) = baseline_with_widget();
        let compilation = live_compilation_like(&old_u);
        let ctx = EmitContext::new("Demo.dll");

        let (_delta, _next) =
            DeltaBuilder::new(baseline.clone(), compilation.clone(), Vec::new())
                .build_generation(&ctx)
                .unwrap();

        let second = DeltaBuilder::new(baseline, compilation, Vec::new()).build_generation(&ctx);
        assert!(matches!(second, Err(Error::GenerationOrder(_))));
    }
}
