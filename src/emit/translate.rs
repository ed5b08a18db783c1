//! The symbol-to-reference classifier.
//!
//! [`ReferenceTranslator`] walks a symbol and produces the one
//! [`MetadataRef`] variant its shape maps to. Classification is driven by
//! two structural predicates evaluated per symbol, "is this symbol itself
//! closed over type arguments" and "is its container", and by whether the
//! symbol is nested. The same symbol always classifies the same way within
//! one pass: translations are memoized per symbol id, so a reference used
//! from a thousand call sites is computed once and every consumer sees a
//! structurally identical value.
//!
//! The translator holds no per-module state of its own; everything
//! module-relative (scopes, the self-reference rule, identity overrides)
//! comes from the [`EmitContext`] passed to each call. One translator
//! serves exactly one universe; feeding it symbols from a second universe
//! would alias ids.

use dashmap::DashMap;

use crate::emit::{
    CallingConvention, CustomModifierData, EmitContext, FieldRefData, MetadataRef,
    MethodInstanceData, MethodRefData, ModifiedTypeData, ModuleRefData, NestedTypeData, ParamData,
    ResolutionScope, TypeDefData, TypeInstanceData,
};
use crate::metadata::diagnostics::EmitErrorCode;
use crate::symbols::{
    CustomModifierSym, FieldRc, MethodRc, ModuleRc, NamedTypeRc, NamedTypeSymbol, ParameterSymbol,
    SymbolId, SymbolRef, TypeSig,
};
use crate::Result;

/// Translates symbols into serializable reference shapes, memoizing per
/// symbol id.
pub struct ReferenceTranslator {
    cache: DashMap<SymbolId, MetadataRef>,
}

impl Default for ReferenceTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceTranslator {
    /// Creates a translator with an empty memo cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    /// Number of distinct symbols translated so far.
    #[must_use]
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Translates any symbol kind.
    ///
    /// Properties and events have no reference shape of their own in
    /// table-based metadata (their accessors are ordinary methods); asking
    /// for one reports [`EmitErrorCode::UnrepresentableSymbol`] and fails.
    pub fn translate(&self, symbol: &SymbolRef, ctx: &EmitContext) -> Result<MetadataRef> {
        match symbol {
            SymbolRef::Assembly(assembly) => Ok(MetadataRef::Assembly(
                ctx.resolver().resolve_assembly_ref(assembly),
            )),
            SymbolRef::Module(module) => Ok(MetadataRef::Module(ModuleRefData {
                name: module.name.clone(),
            })),
            SymbolRef::NamedType(ty) => self.translate_type(ty, ctx),
            SymbolRef::Method(method) => self.translate_method(method, ctx),
            SymbolRef::Field(field) => self.translate_field(field, ctx),
            SymbolRef::Property(property) => {
                ctx.diagnostics().error(
                    EmitErrorCode::UnrepresentableSymbol,
                    format!("property '{}' has no metadata reference shape", property.name),
                    ctx.location_hint().cloned(),
                );
                Err(invariant_error!(
                    "property '{}' is not referenceable",
                    property.name
                ))
            }
            SymbolRef::Event(event) => {
                ctx.diagnostics().error(
                    EmitErrorCode::UnrepresentableSymbol,
                    format!("event '{}' has no metadata reference shape", event.name),
                    ctx.location_hint().cloned(),
                );
                Err(invariant_error!("event '{}' is not referenceable", event.name))
            }
        }
    }

    /// Translates a named type into one of the six type variants.
    pub fn translate_type(&self, ty: &NamedTypeRc, ctx: &EmitContext) -> Result<MetadataRef> {
        if let Some(cached) = self.cache.get(&ty.id()) {
            return Ok(cached.clone());
        }
        let translated = self.classify_type(ty, ctx)?;
        self.cache.insert(ty.id(), translated.clone());
        Ok(translated)
    }

    fn classify_type(&self, ty: &NamedTypeRc, ctx: &EmitContext) -> Result<MetadataRef> {
        match (ty.is_generic_instance(), ty.has_instantiated_container()) {
            // Plain definition: top-level or nested in a definition chain.
            (false, false) => self.type_def_ref(ty, ctx),

            // Instance of a definition whose containers are all definitions.
            (true, false) => {
                let definition = ty.original_definition();
                if !definition.is_definition() {
                    return Err(invariant_error!(
                        "instantiation operand of '{}' is not a definition",
                        ty.structural_key()
                    ));
                }
                let data = TypeInstanceData {
                    definition: Box::new(self.translate_type(&definition, ctx)?),
                    arguments: self.translate_args(&ty.type_arguments, ctx)?,
                };
                if ty.is_nested() {
                    Ok(MetadataRef::NestedTypeInstance(data))
                } else {
                    Ok(MetadataRef::NamespaceTypeInstance(data))
                }
            }

            // Nested definition viewed through an instantiated container.
            (false, true) => Ok(MetadataRef::SpecializedNestedType(
                self.specialized_nested_data(ty, ctx)?,
            )),

            // Instance whose container is itself instantiated. The
            // definition operand is the specialized (uninstantiated) view,
            // reconstructed from this symbol's own container link.
            (true, true) => Ok(MetadataRef::SpecializedNestedTypeInstance(
                TypeInstanceData {
                    definition: Box::new(MetadataRef::SpecializedNestedType(
                        self.specialized_nested_data(ty, ctx)?,
                    )),
                    arguments: self.translate_args(&ty.type_arguments, ctx)?,
                },
            )),
        }
    }

    fn specialized_nested_data(
        &self,
        ty: &NamedTypeRc,
        ctx: &EmitContext,
    ) -> Result<NestedTypeData> {
        let container = ty.containing_type().ok_or_else(|| {
            invariant_error!(
                "'{}' has an instantiated container but no container link",
                ty.structural_key()
            )
        })?;
        Ok(NestedTypeData {
            container: Box::new(self.translate_type(container, ctx)?),
            name: ty.metadata_name(),
            arity: ty.arity(),
        })
    }

    fn type_def_ref(&self, ty: &NamedTypeRc, ctx: &EmitContext) -> Result<MetadataRef> {
        if let Some(container) = ty.containing_type() {
            return Ok(MetadataRef::NestedTypeDef(NestedTypeData {
                container: Box::new(self.translate_type(container, ctx)?),
                name: ty.metadata_name(),
                arity: ty.arity(),
            }));
        }
        Ok(MetadataRef::NamespaceTypeDef(TypeDefData {
            scope: Self::scope_for(ty, ctx)?,
            namespace: ty.namespace.clone(),
            name: ty.metadata_name(),
            arity: ty.arity(),
        }))
    }

    /// Scope of a top-level definition reference. A type with no declared
    /// module belongs to the module being emitted; a type in a sibling or
    /// standalone module scopes to a module reference (never to its own
    /// assembly); anything else scopes to its assembly.
    fn scope_for(ty: &NamedTypeSymbol, ctx: &EmitContext) -> Result<ResolutionScope> {
        let module: &ModuleRc = match &ty.containing_module {
            None => return Ok(ResolutionScope::CurrentModule),
            Some(module) => module,
        };
        if ctx.is_building_module(module) {
            return Ok(ResolutionScope::CurrentModule);
        }
        Ok(match ctx.resolver().resolve_containing_assembly(module, ctx)? {
            Some(assembly_ref) => ResolutionScope::Assembly(assembly_ref),
            None => ResolutionScope::Module(ModuleRefData {
                name: module.name.clone(),
            }),
        })
    }

    /// Translates a method into one of the four method variants.
    pub fn translate_method(&self, method: &MethodRc, ctx: &EmitContext) -> Result<MetadataRef> {
        if let Some(cached) = self.cache.get(&method.id()) {
            return Ok(cached.clone());
        }
        let translated = self.classify_method(method, ctx)?;
        self.cache.insert(method.id(), translated.clone());
        Ok(translated)
    }

    fn classify_method(&self, method: &MethodRc, ctx: &EmitContext) -> Result<MetadataRef> {
        match (method.is_generic_instance(), method.has_instantiated_container()) {
            (false, false) => Ok(MetadataRef::Method(self.method_ref_data(method, ctx)?)),

            (false, true) => Ok(MetadataRef::SpecializedMethod(
                self.method_ref_data(method, ctx)?,
            )),

            (true, false) => {
                let definition = method.original_definition();
                if !definition.is_definition() {
                    return Err(invariant_error!(
                        "instantiation operand of method '{}' is not a definition",
                        method.signature_key()
                    ));
                }
                Ok(MetadataRef::MethodInstance(MethodInstanceData {
                    definition: Box::new(self.translate_method(&definition, ctx)?),
                    arguments: self.translate_args(&method.type_arguments, ctx)?,
                }))
            }

            // The definition operand is the specialized, uninstantiated
            // view: same container link, same signature, no arguments.
            (true, true) => Ok(MetadataRef::SpecializedMethodInstance(MethodInstanceData {
                definition: Box::new(MetadataRef::SpecializedMethod(
                    self.method_ref_data(method, ctx)?,
                )),
                arguments: self.translate_args(&method.type_arguments, ctx)?,
            })),
        }
    }

    fn method_ref_data(&self, method: &MethodRc, ctx: &EmitContext) -> Result<MethodRefData> {
        let container = self.container_ref(&method.containing_type.upgrade(), &method.name, ctx)?;
        let parameters = method
            .parameters
            .iter()
            .map(|p| self.translate_param(p, ctx))
            .collect::<Result<Vec<_>>>()?;
        let mut calling_convention = CallingConvention::static_default();
        calling_convention.has_this = method.has_this();
        calling_convention.generic_arity = method.arity();
        Ok(MethodRefData {
            container: Box::new(container),
            name: method.name.clone(),
            arity: method.arity(),
            calling_convention,
            parameters,
            return_type: Box::new(self.translate_sig(&method.return_type, ctx)?),
        })
    }

    /// Translates a field into one of the two field variants.
    pub fn translate_field(&self, field: &FieldRc, ctx: &EmitContext) -> Result<MetadataRef> {
        if let Some(cached) = self.cache.get(&field.id()) {
            return Ok(cached.clone());
        }

        let container = self.container_ref(&field.containing_type.upgrade(), &field.name, ctx)?;
        let mut field_type = self.translate_sig(&field.field_type, ctx)?;
        if !field.modifiers.is_empty() {
            field_type = MetadataRef::ModifiedType(ModifiedTypeData {
                modifiers: self.translate_modifiers(&field.modifiers, ctx)?,
                unmodified: Box::new(field_type),
            });
        }
        let data = FieldRefData {
            container: Box::new(container),
            name: field.name.clone(),
            field_type: Box::new(field_type),
        };
        let translated = if field.has_instantiated_container() {
            MetadataRef::SpecializedField(data)
        } else {
            MetadataRef::Field(data)
        };

        self.cache.insert(field.id(), translated.clone());
        Ok(translated)
    }

    /// Translates a signature shape, recursing to the innermost named type
    /// or primitive.
    pub fn translate_sig(&self, sig: &TypeSig, ctx: &EmitContext) -> Result<MetadataRef> {
        match sig {
            TypeSig::Primitive(kind) => Ok(MetadataRef::Primitive(*kind)),
            TypeSig::Named(handle) => match handle.upgrade() {
                Some(ty) => self.translate_type(&ty, ctx),
                None => {
                    ctx.diagnostics().error(
                        EmitErrorCode::UnrepresentableSymbol,
                        "signature names a type symbol that is no longer alive",
                        ctx.location_hint().cloned(),
                    );
                    Err(invariant_error!("dangling type handle in signature"))
                }
            },
            TypeSig::Pointer(inner) => Ok(MetadataRef::Pointer(Box::new(
                self.translate_sig(inner, ctx)?,
            ))),
            TypeSig::ByRef(inner) => Ok(MetadataRef::ByRef(Box::new(
                self.translate_sig(inner, ctx)?,
            ))),
            TypeSig::SzArray(inner) => Ok(MetadataRef::SzArray(Box::new(
                self.translate_sig(inner, ctx)?,
            ))),
            TypeSig::TypeParam { index, method } => Ok(MetadataRef::TypeParam {
                index: *index,
                method: *method,
            }),
            TypeSig::Modified { modifiers, inner } => {
                Ok(MetadataRef::ModifiedType(ModifiedTypeData {
                    modifiers: self.translate_modifiers(modifiers, ctx)?,
                    unmodified: Box::new(self.translate_sig(inner, ctx)?),
                }))
            }
        }
    }

    fn translate_args(&self, args: &[TypeSig], ctx: &EmitContext) -> Result<Vec<MetadataRef>> {
        args.iter().map(|arg| self.translate_sig(arg, ctx)).collect()
    }

    fn translate_param(&self, param: &ParameterSymbol, ctx: &EmitContext) -> Result<ParamData> {
        Ok(ParamData {
            name: param.name.clone(),
            param_type: Box::new(self.translate_sig(&param.param_type, ctx)?),
            by_ref: param.by_ref,
            modifiers: self.translate_modifiers(&param.modifiers, ctx)?,
        })
    }

    fn translate_modifiers(
        &self,
        modifiers: &[CustomModifierSym],
        ctx: &EmitContext,
    ) -> Result<Vec<CustomModifierData>> {
        modifiers
            .iter()
            .map(|modifier| {
                let ty = modifier.modifier_type.upgrade().ok_or_else(|| {
                    ctx.diagnostics().error(
                        EmitErrorCode::UnrepresentableSymbol,
                        "custom modifier names a type symbol that is no longer alive",
                        ctx.location_hint().cloned(),
                    );
                    invariant_error!("dangling type handle in custom modifier")
                })?;
                Ok(CustomModifierData {
                    required: modifier.required,
                    modifier: Box::new(self.translate_type(&ty, ctx)?),
                })
            })
            .collect()
    }

    fn container_ref(
        &self,
        container: &Option<NamedTypeRc>,
        member_name: &str,
        ctx: &EmitContext,
    ) -> Result<MetadataRef> {
        match container {
            Some(ty) => self.translate_type(ty, ctx),
            None => {
                ctx.diagnostics().error(
                    EmitErrorCode::UnrepresentableSymbol,
                    format!("containing type of '{member_name}' is no longer alive"),
                    ctx.location_hint().cloned(),
                );
                Err(invariant_error!(
                    "dangling container handle on member '{}'",
                    member_name
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::identity::{AssemblyIdentity, AssemblyVersion};
    use crate::symbols::{
        build_assembly, FieldSymbolBuilder, MethodSymbolBuilder, ModuleSymbolBuilder,
        PrimitiveKind, SymbolUniverse, TypeSymbolBuilder,
    };
    use std::sync::Arc;

    fn universe() -> Arc<SymbolUniverse> {
        Arc::new(SymbolUniverse::new())
    }

    fn ctx() -> EmitContext {
        EmitContext::new("Demo.dll")
    }

    #[test]
    fn test_top_level_definition_in_current_module() {
        let u = universe();
        let ty = TypeSymbolBuilder::new(&u).namespace("Demo").name("Widget").build();

        let translator = ReferenceTranslator::new();
        let translated = translator.translate_type(&ty, &ctx()).unwrap();

        match translated {
            MetadataRef::NamespaceTypeDef(data) => {
                assert_eq!(data.scope, ResolutionScope::CurrentModule);
                assert_eq!(data.namespace, "Demo");
                assert_eq!(data.name, "Widget");
                assert_eq!(data.arity, 0);
            }
            other => panic!("expected NamespaceTypeDef, got {other:?}"),
        }
    }

    #[test]
    fn test_external_type_scopes_to_assembly() {
        let u = universe();
        let external = build_assembly(
            &u,
            AssemblyIdentity::new("External", AssemblyVersion::new(2, 1, 0, 0), None, None),
        );
        let module = ModuleSymbolBuilder::new(&u)
            .name("External.dll")
            .assembly(&external)
            .build();
        let ty = TypeSymbolBuilder::new(&u)
            .namespace("Ext")
            .name("Service")
            .module(&module)
            .build();

        let building = build_assembly(
            &u,
            AssemblyIdentity::new("Demo", AssemblyVersion::new(1, 0, 0, 0), None, None),
        );
        let ctx = EmitContext::new("Demo.dll").with_source_assembly(&building);

        let translator = ReferenceTranslator::new();
        let translated = translator.translate_type(&ty, &ctx).unwrap();

        match translated {
            MetadataRef::NamespaceTypeDef(data) => match data.scope {
                ResolutionScope::Assembly(assembly_ref) => {
                    assert_eq!(assembly_ref.identity.name, "External");
                    assert_eq!(assembly_ref.identity.version, AssemblyVersion::new(2, 1, 0, 0));
                }
                other => panic!("expected assembly scope, got {other:?}"),
            },
            other => panic!("expected NamespaceTypeDef, got {other:?}"),
        }
    }

    #[test]
    fn test_sibling_module_scopes_to_module_not_own_assembly() {
        let u = universe();
        let building = build_assembly(
            &u,
            AssemblyIdentity::new("Demo", AssemblyVersion::new(1, 0, 0, 0), None, None),
        );
        let sibling = ModuleSymbolBuilder::new(&u)
            .name("Demo.Satellite.netmodule")
            .assembly(&building)
            .build();
        let ty = TypeSymbolBuilder::new(&u)
            .namespace("Demo")
            .name("Helper")
            .module(&sibling)
            .build();

        let ctx = EmitContext::new("Demo.dll").with_source_assembly(&building);
        let translator = ReferenceTranslator::new();
        let translated = translator.translate_type(&ty, &ctx).unwrap();

        match translated {
            MetadataRef::NamespaceTypeDef(data) => match data.scope {
                ResolutionScope::Module(module_ref) => {
                    assert_eq!(module_ref.name, "Demo.Satellite.netmodule");
                }
                other => panic!("expected module scope, got {other:?}"),
            },
            other => panic!("expected NamespaceTypeDef, got {other:?}"),
        }
    }

    #[test]
    fn test_six_named_type_variants() {
        let u = universe();
        let outer = TypeSymbolBuilder::new(&u)
            .namespace("Demo")
            .name("Outer")
            .type_parameter("T")
            .build();
        let inner = TypeSymbolBuilder::new(&u)
            .name("Inner")
            .type_parameter("U")
            .containing_type(&outer)
            .build();

        let string_arg = TypeSig::Primitive(PrimitiveKind::String);
        let int_arg = TypeSig::Primitive(PrimitiveKind::I4);

        let outer_string = outer.instantiate(&u, vec![string_arg.clone()]);
        let inner_view = inner.specialize_in(&u, &outer_string);
        let inner_view_int = inner_view.instantiate(&u, vec![int_arg.clone()]);
        let inner_int = inner.instantiate(&u, vec![int_arg]);

        let translator = ReferenceTranslator::new();
        let ctx = ctx();

        assert!(matches!(
            translator.translate_type(&outer, &ctx).unwrap(),
            MetadataRef::NamespaceTypeDef(_)
        ));
        assert!(matches!(
            translator.translate_type(&outer_string, &ctx).unwrap(),
            MetadataRef::NamespaceTypeInstance(_)
        ));
        assert!(matches!(
            translator.translate_type(&inner, &ctx).unwrap(),
            MetadataRef::NestedTypeDef(_)
        ));
        assert!(matches!(
            translator.translate_type(&inner_int, &ctx).unwrap(),
            MetadataRef::NestedTypeInstance(_)
        ));
        assert!(matches!(
            translator.translate_type(&inner_view, &ctx).unwrap(),
            MetadataRef::SpecializedNestedType(_)
        ));
        assert!(matches!(
            translator.translate_type(&inner_view_int, &ctx).unwrap(),
            MetadataRef::SpecializedNestedTypeInstance(_)
        ));
    }

    #[test]
    fn test_specialized_instance_definition_operand_keeps_container_args() {
        let u = universe();
        let outer = TypeSymbolBuilder::new(&u)
            .namespace("Demo")
            .name("Outer")
            .type_parameter("T")
            .build();
        let inner = TypeSymbolBuilder::new(&u)
            .name("Inner")
            .type_parameter("U")
            .containing_type(&outer)
            .build();

        let outer_string = outer.instantiate(&u, vec![TypeSig::Primitive(PrimitiveKind::String)]);
        let inner_view = inner.specialize_in(&u, &outer_string);
        let inner_int = inner_view.instantiate(&u, vec![TypeSig::Primitive(PrimitiveKind::I4)]);

        let translator = ReferenceTranslator::new();
        let translated = translator.translate_type(&inner_int, &ctx()).unwrap();

        let MetadataRef::SpecializedNestedTypeInstance(data) = translated else {
            panic!("expected SpecializedNestedTypeInstance");
        };
        assert_eq!(data.arguments, vec![MetadataRef::Primitive(PrimitiveKind::I4)]);

        let MetadataRef::SpecializedNestedType(nested) = data.definition.as_ref() else {
            panic!("expected SpecializedNestedType definition operand");
        };
        assert_eq!(nested.name, "Inner`1");
        let container_args = nested.container.generic_arguments();
        assert_eq!(container_args, &[MetadataRef::Primitive(PrimitiveKind::String)]);
    }

    #[test]
    fn test_four_method_variants() {
        let u = universe();
        let outer = TypeSymbolBuilder::new(&u)
            .namespace("Demo")
            .name("Outer")
            .type_parameter("T")
            .build();
        let plain = MethodSymbolBuilder::new(&u)
            .name("Run")
            .returns(TypeSig::Primitive(PrimitiveKind::Void))
            .build(&outer);
        let generic = MethodSymbolBuilder::new(&u)
            .name("Create")
            .type_parameter("M")
            .returns(TypeSig::TypeParam { index: 0, method: true })
            .build(&outer);

        let outer_string = outer.instantiate(&u, vec![TypeSig::Primitive(PrimitiveKind::String)]);
        let plain_spec = outer_string.find_method("Run").unwrap();
        let generic_spec = outer_string.find_method("Create").unwrap();

        let generic_inst = generic.instantiate(&u, vec![TypeSig::Primitive(PrimitiveKind::I4)]);
        let generic_spec_inst =
            generic_spec.instantiate(&u, vec![TypeSig::Primitive(PrimitiveKind::I4)]);

        let translator = ReferenceTranslator::new();
        let ctx = ctx();

        assert!(matches!(
            translator.translate_method(&plain, &ctx).unwrap(),
            MetadataRef::Method(_)
        ));
        assert!(matches!(
            translator.translate_method(&plain_spec, &ctx).unwrap(),
            MetadataRef::SpecializedMethod(_)
        ));
        assert!(matches!(
            translator.translate_method(&generic_inst, &ctx).unwrap(),
            MetadataRef::MethodInstance(_)
        ));
        assert!(matches!(
            translator.translate_method(&generic_spec_inst, &ctx).unwrap(),
            MetadataRef::SpecializedMethodInstance(_)
        ));
    }

    #[test]
    fn test_method_ref_carries_signature() {
        let u = universe();
        let ty = TypeSymbolBuilder::new(&u).namespace("Demo").name("C").build();
        let method = MethodSymbolBuilder::new(&u)
            .name("Add")
            .parameter(ParameterSymbol::new("x", TypeSig::Primitive(PrimitiveKind::I4)))
            .parameter(
                ParameterSymbol::new("y", TypeSig::Primitive(PrimitiveKind::I4)).with_by_ref(),
            )
            .returns(TypeSig::Primitive(PrimitiveKind::I4))
            .build(&ty);

        let translator = ReferenceTranslator::new();
        let MetadataRef::Method(data) = translator.translate_method(&method, &ctx()).unwrap()
        else {
            panic!("expected Method");
        };

        assert_eq!(data.name, "Add");
        assert_eq!(data.parameters.len(), 2);
        assert!(!data.parameters[0].by_ref);
        assert!(data.parameters[1].by_ref);
        assert!(data.calling_convention.has_this);
        assert_eq!(data.calling_convention.generic_arity, 0);
        assert_eq!(*data.return_type, MetadataRef::Primitive(PrimitiveKind::I4));
    }

    #[test]
    fn test_static_method_carries_default_convention() {
        let u = universe();
        let ty = TypeSymbolBuilder::new(&u).namespace("Demo").name("C").build();
        let method = MethodSymbolBuilder::new(&u)
            .name("Create")
            .attributes(crate::symbols::MethodAttributes::STATIC)
            .returns(TypeSig::Primitive(PrimitiveKind::Void))
            .build(&ty);

        let translator = ReferenceTranslator::new();
        let MetadataRef::Method(data) = translator.translate_method(&method, &ctx()).unwrap()
        else {
            panic!("expected Method");
        };
        assert_eq!(data.calling_convention, CallingConvention::static_default());
    }

    #[test]
    fn test_field_in_instantiated_container() {
        let u = universe();
        let outer = TypeSymbolBuilder::new(&u)
            .namespace("Demo")
            .name("Outer")
            .type_parameter("T")
            .build();
        let _field = FieldSymbolBuilder::new(&u)
            .name("_items")
            .field_type(TypeSig::TypeParam { index: 0, method: false })
            .build(&outer);

        let outer_string = outer.instantiate(&u, vec![TypeSig::Primitive(PrimitiveKind::String)]);
        let specialized = outer_string.find_field("_items").unwrap();
        let plain = outer.find_field("_items").unwrap();

        let translator = ReferenceTranslator::new();
        let ctx = ctx();

        assert!(matches!(
            translator.translate_field(&plain, &ctx).unwrap(),
            MetadataRef::Field(_)
        ));
        let MetadataRef::SpecializedField(data) =
            translator.translate_field(&specialized, &ctx).unwrap()
        else {
            panic!("expected SpecializedField");
        };
        assert_eq!(data.name, "_items");
        assert!(data.container.is_type_reference());
        assert_eq!(
            data.container.generic_arguments(),
            &[MetadataRef::Primitive(PrimitiveKind::String)]
        );
    }

    #[test]
    fn test_translation_is_memoized_and_stable() {
        let u = universe();
        let list = TypeSymbolBuilder::new(&u)
            .namespace("System.Collections.Generic")
            .name("List")
            .type_parameter("T")
            .build();
        let list_int = list.instantiate(&u, vec![TypeSig::Primitive(PrimitiveKind::I4)]);

        let translator = ReferenceTranslator::new();
        let ctx = ctx();

        let first = translator.translate_type(&list_int, &ctx).unwrap();
        let count_after_first = translator.cached_count();
        let second = translator.translate_type(&list_int, &ctx).unwrap();

        assert_eq!(first, second);
        assert_eq!(translator.cached_count(), count_after_first);
    }

    #[test]
    fn test_generic_arguments_preserve_declaration_order() {
        let u = universe();
        let pair = TypeSymbolBuilder::new(&u)
            .namespace("Demo")
            .name("Pair")
            .type_parameter("K")
            .type_parameter("V")
            .build();
        let pair_inst = pair.instantiate(
            &u,
            vec![
                TypeSig::Primitive(PrimitiveKind::String),
                TypeSig::Primitive(PrimitiveKind::I4),
            ],
        );

        let translator = ReferenceTranslator::new();
        let translated = translator.translate_type(&pair_inst, &ctx()).unwrap();

        assert_eq!(
            translated.generic_arguments(),
            &[
                MetadataRef::Primitive(PrimitiveKind::String),
                MetadataRef::Primitive(PrimitiveKind::I4),
            ]
        );
    }

    #[test]
    fn test_signature_shapes_translate_recursively() {
        let u = universe();
        let list = TypeSymbolBuilder::new(&u)
            .namespace("System.Collections.Generic")
            .name("List")
            .type_parameter("T")
            .build();
        let list_int = list.instantiate(&u, vec![TypeSig::Primitive(PrimitiveKind::I4)]);

        let sig = TypeSig::SzArray(Box::new(TypeSig::ByRef(Box::new(TypeSig::named(&list_int)))));
        let translator = ReferenceTranslator::new();
        let translated = translator.translate_sig(&sig, &ctx()).unwrap();

        let MetadataRef::SzArray(inner) = translated else {
            panic!("expected SzArray");
        };
        let MetadataRef::ByRef(inner) = *inner else {
            panic!("expected ByRef");
        };
        assert!(matches!(*inner, MetadataRef::NamespaceTypeInstance(_)));
    }

    #[test]
    fn test_property_translation_reports_diagnostic() {
        let u = universe();
        let ty = TypeSymbolBuilder::new(&u).namespace("Demo").name("C").build();
        let property = crate::symbols::PropertySymbol::new(
            &u,
            "Count",
            TypeSig::Primitive(PrimitiveKind::I4),
            &ty,
        );

        let ctx = ctx();
        let translator = ReferenceTranslator::new();
        let result = translator.translate(&SymbolRef::Property(property), &ctx);

        assert!(result.is_err());
        assert!(ctx.diagnostics().has_errors());
        assert_eq!(
            ctx.diagnostics()
                .by_code(EmitErrorCode::UnrepresentableSymbol)
                .len(),
            1
        );
    }
}
