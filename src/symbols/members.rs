//! Member symbols: methods, fields, properties, events.
//!
//! Members link to their containing type through the weak [`TypeHandle`]
//! wrapper; containers own their members, never the reverse. Like named
//! types, a member is either a definition or a specialized/instantiated view
//! of one, and the view always links back to the definition it came from.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::symbols::{
    CustomModifierSym, NamedTypeRc, SymbolId, SymbolUniverse, TypeHandle, TypeSig,
};

/// Reference-counted handle to a [`MethodSymbol`]
pub type MethodRc = Arc<MethodSymbol>;
/// Reference-counted handle to a [`FieldSymbol`]
pub type FieldRc = Arc<FieldSymbol>;
/// Reference-counted handle to a [`PropertySymbol`]
pub type PropertyRc = Arc<PropertySymbol>;
/// Reference-counted handle to an [`EventSymbol`]
pub type EventRc = Arc<EventSymbol>;

bitflags! {
    /// Subset of metadata method attributes consulted by this subsystem.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MethodAttributes: u32 {
        /// Method is static (no `this` in the calling convention)
        const STATIC = 0x0010;
        /// Method cannot be overridden
        const FINAL = 0x0020;
        /// Method is virtual
        const VIRTUAL = 0x0040;
        /// Method is abstract
        const ABSTRACT = 0x0400;
        /// Name carries special meaning to tooling
        const SPECIAL_NAME = 0x0800;
    }
}

bitflags! {
    /// Subset of metadata field attributes consulted by this subsystem.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FieldAttributes: u32 {
        /// Field is static
        const STATIC = 0x0010;
        /// Field is read-only after construction
        const INIT_ONLY = 0x0020;
        /// Field is a compile-time constant
        const LITERAL = 0x0040;
        /// Name carries special meaning to tooling
        const SPECIAL_NAME = 0x0200;
    }
}

/// A formal parameter on a method.
#[derive(Clone, Debug)]
pub struct ParameterSymbol {
    /// Parameter name, if declared
    pub name: Option<String>,
    /// Parameter type signature
    pub param_type: TypeSig,
    /// Passed by managed reference
    pub by_ref: bool,
    /// Custom modifiers on the parameter
    pub modifiers: Vec<CustomModifierSym>,
}

impl ParameterSymbol {
    /// Creates a by-value parameter with no modifiers.
    #[must_use]
    pub fn new(name: impl Into<String>, param_type: TypeSig) -> Self {
        Self {
            name: Some(name.into()),
            param_type,
            by_ref: false,
            modifiers: Vec::new(),
        }
    }

    /// Marks the parameter as by-ref.
    #[must_use]
    pub fn with_by_ref(mut self) -> Self {
        self.by_ref = true;
        self
    }

    /// Adds a custom modifier to the parameter.
    #[must_use]
    pub fn with_modifier(mut self, modifier: CustomModifierSym) -> Self {
        self.modifiers.push(modifier);
        self
    }

    /// Canonical structural key of the parameter (type, by-ref flag, and
    /// modifiers; the name does not participate in matching).
    #[must_use]
    pub fn key(&self) -> String {
        let mut key = self.param_type.key();
        for modifier in &self.modifiers {
            let name = modifier
                .modifier_type
                .upgrade()
                .map_or_else(|| "<dropped>".to_string(), |t| t.structural_key());
            let marker = if modifier.required { "modreq" } else { "modopt" };
            key = format!("{key} {marker}({name})");
        }
        if self.by_ref {
            key.push('&');
        }
        key
    }
}

/// A local variable declared in a method body.
///
/// Carries the source position of its declarator so the delta layer can
/// remap slots through an edit's position-correlation function.
#[derive(Clone, Debug)]
pub struct LocalDefinition {
    /// Local name, if not compiler-generated
    pub name: Option<String>,
    /// Local type signature
    pub sig: TypeSig,
    /// Source position of the declarator
    pub position: u32,
}

impl LocalDefinition {
    /// Creates a new local definition.
    #[must_use]
    pub fn new(name: Option<String>, sig: TypeSig, position: u32) -> Self {
        Self {
            name,
            sig,
            position,
        }
    }
}

/// A method symbol.
pub struct MethodSymbol {
    id: SymbolId,
    /// Method name
    pub name: String,
    /// Metadata attributes
    pub attributes: MethodAttributes,
    /// Containing type (weak; containers own members)
    pub containing_type: TypeHandle,
    /// Declared generic parameter names, in declaration order
    pub type_parameters: Vec<String>,
    /// Type arguments, non-empty exactly for generic-method instances
    pub type_arguments: Vec<TypeSig>,
    /// Formal parameters in declaration order
    pub parameters: Vec<ParameterSymbol>,
    /// Return type signature, possibly modified
    pub return_type: TypeSig,
    /// Locals declared in the body, in slot order
    pub locals: Vec<LocalDefinition>,
    pub(crate) original_definition: Option<MethodRc>,
}

impl MethodSymbol {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new_definition(
        universe: &SymbolUniverse,
        name: String,
        attributes: MethodAttributes,
        containing_type: TypeHandle,
        type_parameters: Vec<String>,
        parameters: Vec<ParameterSymbol>,
        return_type: TypeSig,
        locals: Vec<LocalDefinition>,
    ) -> MethodRc {
        Arc::new(Self {
            id: universe.allocate_id(),
            name,
            attributes,
            containing_type,
            type_parameters,
            type_arguments: Vec::new(),
            parameters,
            return_type,
            locals,
            original_definition: None,
        })
    }

    /// Returns the per-universe symbol id.
    #[must_use]
    pub fn id(&self) -> SymbolId {
        self.id
    }

    /// Generic arity of the method itself.
    #[must_use]
    pub fn arity(&self) -> u16 {
        self.type_parameters.len() as u16
    }

    /// Returns true for definitions (not instances, not specialized views).
    #[must_use]
    pub fn is_definition(&self) -> bool {
        self.original_definition.is_none()
    }

    /// Returns true when the method is closed over its own type arguments.
    #[must_use]
    pub fn is_generic_instance(&self) -> bool {
        !self.type_arguments.is_empty()
    }

    /// Returns the definition this symbol is a view of; a definition
    /// returns itself.
    #[must_use]
    pub fn original_definition(self: &MethodRc) -> MethodRc {
        self.original_definition
            .clone()
            .unwrap_or_else(|| self.clone())
    }

    /// Returns true if the containing type is an instantiation or a
    /// specialized view.
    #[must_use]
    pub fn has_instantiated_container(&self) -> bool {
        self.containing_type
            .upgrade()
            .is_some_and(|c| !c.is_definition())
    }

    /// Returns true if the method has an implicit `this` parameter.
    #[must_use]
    pub fn has_this(&self) -> bool {
        !self.attributes.contains(MethodAttributes::STATIC)
    }

    /// Canonical structural key: name, arity, parameter keys, return key.
    /// Two methods from independent universes match exactly when their keys
    /// and containing-type keys match.
    #[must_use]
    pub fn signature_key(&self) -> String {
        let params: Vec<String> = self.parameters.iter().map(ParameterSymbol::key).collect();
        format!(
            "{}`{}({}):{}",
            self.name,
            self.arity(),
            params.join(","),
            self.return_type.key()
        )
    }

    /// Produces the specialized view of this method inside `view`, a
    /// non-definition view of the containing type.
    pub(crate) fn specialize(
        self: &MethodRc,
        universe: &SymbolUniverse,
        view: &NamedTypeRc,
    ) -> MethodRc {
        Arc::new(Self {
            id: universe.allocate_id(),
            name: self.name.clone(),
            attributes: self.attributes,
            containing_type: TypeHandle::new(view),
            type_parameters: self.type_parameters.clone(),
            type_arguments: self.type_arguments.clone(),
            parameters: self.parameters.clone(),
            return_type: self.return_type.clone(),
            locals: self.locals.clone(),
            original_definition: Some(self.clone().original_definition()),
        })
    }

    /// Creates a generic-method instance closed over `args`.
    ///
    /// Valid on definitions and on specialized views (the latter yields the
    /// specialized-generic-instance shape).
    ///
    /// # Panics
    ///
    /// Panics if the method is already an instance or `args` does not match
    /// the arity.
    #[must_use]
    pub fn instantiate(
        self: &MethodRc,
        universe: &SymbolUniverse,
        args: Vec<TypeSig>,
    ) -> MethodRc {
        assert!(
            self.type_arguments.is_empty(),
            "instantiate of already-instantiated method '{}'",
            self.name
        );
        assert_eq!(
            args.len(),
            self.type_parameters.len(),
            "instantiate of '{}' with wrong argument count",
            self.name
        );

        Arc::new(Self {
            id: universe.allocate_id(),
            name: self.name.clone(),
            attributes: self.attributes,
            containing_type: self.containing_type.clone(),
            type_parameters: self.type_parameters.clone(),
            type_arguments: args,
            parameters: self.parameters.clone(),
            return_type: self.return_type.clone(),
            locals: self.locals.clone(),
            original_definition: Some(self.clone().original_definition()),
        })
    }
}

impl fmt::Debug for MethodSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MethodSymbol({})", self.signature_key())
    }
}

/// A field symbol.
pub struct FieldSymbol {
    id: SymbolId,
    /// Field name
    pub name: String,
    /// Metadata attributes
    pub attributes: FieldAttributes,
    /// Declared field type
    pub field_type: TypeSig,
    /// Custom modifiers on the field signature
    pub modifiers: Vec<CustomModifierSym>,
    /// Containing type (weak; containers own members)
    pub containing_type: TypeHandle,
    pub(crate) original_definition: Option<FieldRc>,
}

impl FieldSymbol {
    pub(crate) fn new_definition(
        universe: &SymbolUniverse,
        name: String,
        attributes: FieldAttributes,
        field_type: TypeSig,
        modifiers: Vec<CustomModifierSym>,
        containing_type: TypeHandle,
    ) -> FieldRc {
        Arc::new(Self {
            id: universe.allocate_id(),
            name,
            attributes,
            field_type,
            modifiers,
            containing_type,
            original_definition: None,
        })
    }

    /// Returns the per-universe symbol id.
    #[must_use]
    pub fn id(&self) -> SymbolId {
        self.id
    }

    /// Returns true for definitions (not specialized views).
    #[must_use]
    pub fn is_definition(&self) -> bool {
        self.original_definition.is_none()
    }

    /// Returns the definition this symbol is a view of; a definition
    /// returns itself.
    #[must_use]
    pub fn original_definition(self: &FieldRc) -> FieldRc {
        self.original_definition
            .clone()
            .unwrap_or_else(|| self.clone())
    }

    /// Returns true if the containing type is an instantiation or a
    /// specialized view.
    #[must_use]
    pub fn has_instantiated_container(&self) -> bool {
        self.containing_type
            .upgrade()
            .is_some_and(|c| !c.is_definition())
    }

    /// Canonical structural key: name and declared-type key (modifiers
    /// included).
    #[must_use]
    pub fn signature_key(&self) -> String {
        let mut type_key = self.field_type.key();
        for modifier in &self.modifiers {
            let name = modifier
                .modifier_type
                .upgrade()
                .map_or_else(|| "<dropped>".to_string(), |t| t.structural_key());
            let marker = if modifier.required { "modreq" } else { "modopt" };
            type_key = format!("{type_key} {marker}({name})");
        }
        format!("{}:{}", self.name, type_key)
    }

    pub(crate) fn specialize(
        self: &FieldRc,
        universe: &SymbolUniverse,
        view: &NamedTypeRc,
    ) -> FieldRc {
        Arc::new(Self {
            id: universe.allocate_id(),
            name: self.name.clone(),
            attributes: self.attributes,
            field_type: self.field_type.clone(),
            modifiers: self.modifiers.clone(),
            containing_type: TypeHandle::new(view),
            original_definition: Some(self.clone().original_definition()),
        })
    }
}

impl fmt::Debug for FieldSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldSymbol({})", self.signature_key())
    }
}

/// A property symbol.
///
/// Properties participate only in the delta ledgers and structural matching;
/// their accessors are ordinary method symbols.
pub struct PropertySymbol {
    id: SymbolId,
    /// Property name
    pub name: String,
    /// Declared property type
    pub property_type: TypeSig,
    /// Containing type (weak; containers own members)
    pub containing_type: TypeHandle,
}

impl PropertySymbol {
    /// Creates a new property symbol.
    #[must_use]
    pub fn new(
        universe: &SymbolUniverse,
        name: impl Into<String>,
        property_type: TypeSig,
        containing_type: &NamedTypeRc,
    ) -> PropertyRc {
        Arc::new(Self {
            id: universe.allocate_id(),
            name: name.into(),
            property_type,
            containing_type: TypeHandle::new(containing_type),
        })
    }

    /// Returns the per-universe symbol id.
    #[must_use]
    pub fn id(&self) -> SymbolId {
        self.id
    }
}

/// An event symbol.
///
/// Like properties, events participate only in the delta ledgers and
/// structural matching.
pub struct EventSymbol {
    id: SymbolId,
    /// Event name
    pub name: String,
    /// Declared delegate type
    pub event_type: TypeSig,
    /// Containing type (weak; containers own members)
    pub containing_type: TypeHandle,
}

impl EventSymbol {
    /// Creates a new event symbol.
    #[must_use]
    pub fn new(
        universe: &SymbolUniverse,
        name: impl Into<String>,
        event_type: TypeSig,
        containing_type: &NamedTypeRc,
    ) -> EventRc {
        Arc::new(Self {
            id: universe.allocate_id(),
            name: name.into(),
            event_type,
            containing_type: TypeHandle::new(containing_type),
        })
    }

    /// Returns the per-universe symbol id.
    #[must_use]
    pub fn id(&self) -> SymbolId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{
        MethodSymbolBuilder, PrimitiveKind, SymbolUniverse, TypeSymbolBuilder,
    };
    use std::sync::Arc;

    fn universe() -> Arc<SymbolUniverse> {
        Arc::new(SymbolUniverse::new())
    }

    #[test]
    fn test_signature_key_covers_params_and_return() {
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

        assert_eq!(
            method.signature_key(),
            "Add`0(System.Int32,System.Int32&):System.Int32"
        );
    }

    #[test]
    fn test_method_instance_tracks_definition() {
        let u = universe();
        let ty = TypeSymbolBuilder::new(&u).namespace("Demo").name("C").build();
        let method = MethodSymbolBuilder::new(&u)
            .name("Create")
            .type_parameter("T")
            .returns(TypeSig::TypeParam {
                index: 0,
                method: true,
            })
            .build(&ty);

        let inst = method.instantiate(&u, vec![TypeSig::Primitive(PrimitiveKind::String)]);
        assert!(inst.is_generic_instance());
        assert!(!inst.is_definition());
        assert!(Arc::ptr_eq(&inst.original_definition(), &method));
        assert_eq!(inst.type_arguments.len(), 1);
    }

    #[test]
    #[should_panic(expected = "wrong argument count")]
    fn test_method_instantiate_wrong_arity_panics() {
        let u = universe();
        let ty = TypeSymbolBuilder::new(&u).name("C").build();
        let method = MethodSymbolBuilder::new(&u)
            .name("M")
            .type_parameter("T")
            .build(&ty);
        let _ = method.instantiate(&u, vec![]);
    }

    #[test]
    fn test_has_this_follows_static_flag() {
        let u = universe();
        let ty = TypeSymbolBuilder::new(&u).name("C").build();
        let inst_method = MethodSymbolBuilder::new(&u).name("M").build(&ty);
        let static_method = MethodSymbolBuilder::new(&u)
            .name("S")
            .attributes(MethodAttributes::STATIC)
            .build(&ty);

        assert!(inst_method.has_this());
        assert!(!static_method.has_this());
    }
}
