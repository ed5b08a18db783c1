//! Fluent builders for constructing symbol graphs.
//!
//! The semantic-analysis layer (and this crate's tests) construct symbol
//! universes through these builders rather than by filling in structs: the
//! builders allocate ids, register definitions in the universe index, and
//! wire the member/container links with the right strength.
//!
//! # Example
//!
//! ```rust
//! use cilemit::symbols::{
//!     MethodSymbolBuilder, ParameterSymbol, PrimitiveKind, SymbolUniverse, TypeSig,
//!     TypeSymbolBuilder,
//! };
//! use std::sync::Arc;
//!
//! let universe = Arc::new(SymbolUniverse::new());
//! let widget = TypeSymbolBuilder::new(&universe)
//!     .namespace("Demo")
//!     .name("Widget")
//!     .build();
//! let render = MethodSymbolBuilder::new(&universe)
//!     .name("Render")
//!     .parameter(ParameterSymbol::new("depth", TypeSig::Primitive(PrimitiveKind::I4)))
//!     .returns(TypeSig::Primitive(PrimitiveKind::Void))
//!     .build(&widget);
//!
//! assert_eq!(widget.find_method("Render").unwrap().id(), render.id());
//! ```

use std::sync::Arc;

use uguid::Guid;

use crate::{
    metadata::identity::AssemblyIdentity,
    symbols::{
        AssemblyRc, AssemblySymbol, CustomModifierSym, FieldAttributes, FieldRc, FieldSymbol,
        LocalDefinition, MethodAttributes, MethodRc, MethodSymbol, ModuleRc, ModuleSymbol,
        NamedTypeRc, NamedTypeSymbol, ParameterSymbol, PrimitiveKind, SymbolUniverse,
        TypeAttributes, TypeHandle, TypeSig,
    },
};

/// Fluent builder for named type definitions.
pub struct TypeSymbolBuilder {
    universe: Arc<SymbolUniverse>,
    namespace: String,
    name: String,
    attributes: TypeAttributes,
    is_embedded_interop: bool,
    is_anonymous: bool,
    type_parameters: Vec<String>,
    base: Option<TypeHandle>,
    containing_module: Option<ModuleRc>,
    containing_type: Option<NamedTypeRc>,
}

impl TypeSymbolBuilder {
    /// Creates a builder registering into `universe`.
    #[must_use]
    pub fn new(universe: &Arc<SymbolUniverse>) -> Self {
        Self {
            universe: universe.clone(),
            namespace: String::new(),
            name: String::new(),
            attributes: TypeAttributes::empty(),
            is_embedded_interop: false,
            is_anonymous: false,
            type_parameters: Vec::new(),
            base: None,
            containing_module: None,
            containing_type: None,
        }
    }

    /// Sets the namespace (ignored for nested types).
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Sets the simple type name (without arity suffix).
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the metadata attributes.
    #[must_use]
    pub fn attributes(mut self, attributes: TypeAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Declares one generic parameter; call repeatedly in declaration order.
    #[must_use]
    pub fn type_parameter(mut self, name: impl Into<String>) -> Self {
        self.type_parameters.push(name.into());
        self
    }

    /// Marks the type as a locally embedded interop type.
    #[must_use]
    pub fn embedded_interop(mut self) -> Self {
        self.is_embedded_interop = true;
        self
    }

    /// Marks the type as a structurally generated anonymous type.
    #[must_use]
    pub fn anonymous(mut self) -> Self {
        self.is_anonymous = true;
        self
    }

    /// Sets the base type.
    #[must_use]
    pub fn base_type(mut self, base: &NamedTypeRc) -> Self {
        self.base = Some(TypeHandle::new(base));
        self
    }

    /// Declares the type in `module` (an external or sibling module).
    ///
    /// Leave unset for types declared in the module currently being
    /// emitted; the translator resolves an unset module to the current
    /// resolution scope.
    #[must_use]
    pub fn module(mut self, module: &ModuleRc) -> Self {
        self.containing_module = Some(module.clone());
        self
    }

    /// Nests the type inside `container` (must be a definition).
    #[must_use]
    pub fn containing_type(mut self, container: &NamedTypeRc) -> Self {
        self.containing_type = Some(container.clone());
        self
    }

    /// Builds and registers the definition.
    ///
    /// # Panics
    ///
    /// Panics if no name was set, or if the declared container is not a
    /// definition.
    #[must_use]
    pub fn build(self) -> NamedTypeRc {
        assert!(!self.name.is_empty(), "type builder requires a name");
        if let Some(container) = &self.containing_type {
            assert!(
                container.is_definition(),
                "definitions nest in definitions; got a view of '{}'",
                container.fully_qualified_name()
            );
        }

        let ty = NamedTypeSymbol::new_definition(
            &self.universe,
            self.name,
            self.namespace,
            self.attributes,
            self.is_embedded_interop,
            self.is_anonymous,
            self.type_parameters,
            self.base,
            self.containing_module,
            self.containing_type,
        );
        self.universe.register_type(&ty);
        ty
    }
}

/// Fluent builder for method definitions.
pub struct MethodSymbolBuilder {
    universe: Arc<SymbolUniverse>,
    name: String,
    attributes: MethodAttributes,
    type_parameters: Vec<String>,
    parameters: Vec<ParameterSymbol>,
    return_type: TypeSig,
    locals: Vec<LocalDefinition>,
}

impl MethodSymbolBuilder {
    /// Creates a builder allocating ids from `universe`.
    #[must_use]
    pub fn new(universe: &Arc<SymbolUniverse>) -> Self {
        Self {
            universe: universe.clone(),
            name: String::new(),
            attributes: MethodAttributes::empty(),
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            return_type: TypeSig::Primitive(PrimitiveKind::Void),
            locals: Vec::new(),
        }
    }

    /// Sets the method name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the metadata attributes.
    #[must_use]
    pub fn attributes(mut self, attributes: MethodAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Declares one generic parameter; call repeatedly in declaration order.
    #[must_use]
    pub fn type_parameter(mut self, name: impl Into<String>) -> Self {
        self.type_parameters.push(name.into());
        self
    }

    /// Appends a formal parameter.
    #[must_use]
    pub fn parameter(mut self, parameter: ParameterSymbol) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Sets the return type (defaults to void).
    #[must_use]
    pub fn returns(mut self, return_type: TypeSig) -> Self {
        self.return_type = return_type;
        self
    }

    /// Appends a local variable declaration.
    #[must_use]
    pub fn local(mut self, local: LocalDefinition) -> Self {
        self.locals.push(local);
        self
    }

    /// Builds the method and attaches it to `containing_type`.
    ///
    /// # Panics
    ///
    /// Panics if no name was set.
    #[must_use]
    pub fn build(self, containing_type: &NamedTypeRc) -> MethodRc {
        assert!(!self.name.is_empty(), "method builder requires a name");
        let method = MethodSymbol::new_definition(
            &self.universe,
            self.name,
            self.attributes,
            TypeHandle::new(containing_type),
            self.type_parameters,
            self.parameters,
            self.return_type,
            self.locals,
        );
        containing_type.methods.push(method.clone());
        method
    }
}

/// Fluent builder for field definitions.
pub struct FieldSymbolBuilder {
    universe: Arc<SymbolUniverse>,
    name: String,
    attributes: FieldAttributes,
    field_type: TypeSig,
    modifiers: Vec<CustomModifierSym>,
}

impl FieldSymbolBuilder {
    /// Creates a builder allocating ids from `universe`.
    #[must_use]
    pub fn new(universe: &Arc<SymbolUniverse>) -> Self {
        Self {
            universe: universe.clone(),
            name: String::new(),
            attributes: FieldAttributes::empty(),
            field_type: TypeSig::Primitive(PrimitiveKind::Object),
            modifiers: Vec::new(),
        }
    }

    /// Sets the field name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the metadata attributes.
    #[must_use]
    pub fn attributes(mut self, attributes: FieldAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Sets the declared field type.
    #[must_use]
    pub fn field_type(mut self, field_type: TypeSig) -> Self {
        self.field_type = field_type;
        self
    }

    /// Appends a custom modifier to the field signature.
    #[must_use]
    pub fn modifier(mut self, modifier: CustomModifierSym) -> Self {
        self.modifiers.push(modifier);
        self
    }

    /// Builds the field and attaches it to `containing_type`.
    ///
    /// # Panics
    ///
    /// Panics if no name was set.
    #[must_use]
    pub fn build(self, containing_type: &NamedTypeRc) -> FieldRc {
        assert!(!self.name.is_empty(), "field builder requires a name");
        let field = FieldSymbol::new_definition(
            &self.universe,
            self.name,
            self.attributes,
            self.field_type,
            self.modifiers,
            TypeHandle::new(containing_type),
        );
        containing_type.fields.push(field.clone());
        field
    }
}

/// Fluent builder for module symbols, optionally attached to an assembly.
pub struct ModuleSymbolBuilder {
    universe: Arc<SymbolUniverse>,
    name: String,
    mvid: Guid,
    assembly: Option<AssemblyRc>,
}

impl ModuleSymbolBuilder {
    /// Creates a builder allocating ids from `universe`.
    #[must_use]
    pub fn new(universe: &Arc<SymbolUniverse>) -> Self {
        Self {
            universe: universe.clone(),
            name: String::new(),
            mvid: Guid::ZERO,
            assembly: None,
        }
    }

    /// Sets the module file name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the persistent module version id.
    #[must_use]
    pub fn mvid(mut self, mvid: Guid) -> Self {
        self.mvid = mvid;
        self
    }

    /// Attaches the module to `assembly` on build.
    #[must_use]
    pub fn assembly(mut self, assembly: &AssemblyRc) -> Self {
        self.assembly = Some(assembly.clone());
        self
    }

    /// Builds the module (and links it to its assembly, if any).
    ///
    /// # Panics
    ///
    /// Panics if no name was set.
    #[must_use]
    pub fn build(self) -> ModuleRc {
        assert!(!self.name.is_empty(), "module builder requires a name");
        let module = ModuleSymbol::new(&self.universe, self.name, self.mvid);
        if let Some(assembly) = &self.assembly {
            assembly.attach_module(&module);
        }
        module
    }
}

/// Convenience constructor for an assembly symbol from an identity.
#[must_use]
pub fn build_assembly(universe: &Arc<SymbolUniverse>, identity: AssemblyIdentity) -> AssemblyRc {
    AssemblySymbol::new(universe, identity)
}
