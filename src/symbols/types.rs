//! Named type symbols and signature shapes.
//!
//! A [`NamedTypeSymbol`] is one of three things, distinguished structurally:
//!
//! - a **definition**: what source or decoded metadata declares; registered
//!   in its universe's by-name index
//! - a **generic instance**: a definition closed over type arguments
//!   (`List<int>`); carries the arguments and a link to the definition
//! - a **specialized nested type**: a nested definition viewed through an
//!   instantiated container (`Outer<string>.Inner`); carries the container
//!   link and the definition link but no arguments of its own
//!
//! Pointer, by-ref, and array shapes are not symbols; they are recursive
//! [`TypeSig`] wrappers around an inner signature, with a statically finite
//! depth. Member-to-container links use the weak [`TypeHandle`] wrapper so
//! the container/member cycle stays collectable.

use std::fmt;
use std::sync::{Arc, Weak};

use bitflags::bitflags;

use crate::symbols::{FieldRc, MethodRc, ModuleRc, SymbolId, SymbolUniverse};

/// Reference-counted handle to a [`NamedTypeSymbol`]
pub type NamedTypeRc = Arc<NamedTypeSymbol>;

bitflags! {
    /// Subset of metadata type attributes consulted by this subsystem.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TypeAttributes: u32 {
        /// Type is visible outside the assembly
        const PUBLIC = 0x0000_0001;
        /// Type is an interface
        const INTERFACE = 0x0000_0020;
        /// Type is abstract
        const ABSTRACT = 0x0000_0080;
        /// Type is sealed
        const SEALED = 0x0000_0100;
        /// Name carries special meaning to tooling
        const SPECIAL_NAME = 0x0000_0400;
        /// Type is imported from COM interop metadata
        const IMPORT = 0x0000_1000;
    }
}

/// Weak reference to a named type symbol.
///
/// Used for member-to-container links, where a strong reference would make
/// the container/member cycle uncollectable. Mirrors the usual pattern of a
/// thin wrapper with `upgrade`/`expect` accessors.
#[derive(Clone)]
pub struct TypeHandle(Weak<NamedTypeSymbol>);

impl TypeHandle {
    /// Creates a handle from a strong reference.
    #[must_use]
    pub fn new(strong: &NamedTypeRc) -> Self {
        TypeHandle(Arc::downgrade(strong))
    }

    /// Attempts to upgrade to a strong reference.
    #[must_use]
    pub fn upgrade(&self) -> Option<NamedTypeRc> {
        self.0.upgrade()
    }

    /// Upgrades to a strong reference, panicking with `msg` if the target
    /// has been dropped. Graph ownership is the analysis layer's contract;
    /// a dangling handle is a programmer error, not a diagnostic.
    #[must_use]
    pub fn expect(&self, msg: &str) -> NamedTypeRc {
        self.0.upgrade().expect(msg)
    }

    /// Returns true if the target is still alive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(ty) => write!(f, "TypeHandle({})", ty.fully_qualified_name()),
            None => write!(f, "TypeHandle(<dropped>)"),
        }
    }
}

/// Built-in primitive kinds with fixed metadata encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// `void`
    Void,
    /// `bool`
    Boolean,
    /// `char`
    Char,
    /// `i8`
    I1,
    /// `u8`
    U1,
    /// `i16`
    I2,
    /// `u16`
    U2,
    /// `i32`
    I4,
    /// `u32`
    U4,
    /// `i64`
    I8,
    /// `u64`
    U8,
    /// `f32`
    R4,
    /// `f64`
    R8,
    /// native int
    I,
    /// native unsigned int
    U,
    /// `System.Object`
    Object,
    /// `System.String`
    String,
}

impl PrimitiveKind {
    /// Returns the runtime type name backing this primitive.
    #[must_use]
    pub fn fully_qualified_name(&self) -> &'static str {
        match self {
            PrimitiveKind::Void => "System.Void",
            PrimitiveKind::Boolean => "System.Boolean",
            PrimitiveKind::Char => "System.Char",
            PrimitiveKind::I1 => "System.SByte",
            PrimitiveKind::U1 => "System.Byte",
            PrimitiveKind::I2 => "System.Int16",
            PrimitiveKind::U2 => "System.UInt16",
            PrimitiveKind::I4 => "System.Int32",
            PrimitiveKind::U4 => "System.UInt32",
            PrimitiveKind::I8 => "System.Int64",
            PrimitiveKind::U8 => "System.UInt64",
            PrimitiveKind::R4 => "System.Single",
            PrimitiveKind::R8 => "System.Double",
            PrimitiveKind::I => "System.IntPtr",
            PrimitiveKind::U => "System.UIntPtr",
            PrimitiveKind::Object => "System.Object",
            PrimitiveKind::String => "System.String",
        }
    }
}

/// A required or optional custom modifier attached to a signature.
#[derive(Clone, Debug)]
pub struct CustomModifierSym {
    /// Required (`modreq`) vs. optional (`modopt`)
    pub required: bool,
    /// The modifier type
    pub modifier_type: TypeHandle,
}

/// A recursive, finite signature shape.
///
/// Pointer/by-ref/array shapes wrap an inner signature rather than being
/// symbols of their own; translation applies recursively to the innermost
/// named type or primitive.
#[derive(Clone, Debug)]
pub enum TypeSig {
    /// A built-in primitive
    Primitive(PrimitiveKind),
    /// A named type (definition, instance, or specialized nested type)
    Named(TypeHandle),
    /// Unmanaged pointer to the inner signature
    Pointer(Box<TypeSig>),
    /// Managed by-ref to the inner signature
    ByRef(Box<TypeSig>),
    /// Single-dimensional, zero-based array of the inner signature
    SzArray(Box<TypeSig>),
    /// Generic parameter position; `method` selects `!!n` over `!n`
    TypeParam {
        /// Zero-based parameter position
        index: u16,
        /// Method parameter (`!!n`) vs. type parameter (`!n`)
        method: bool,
    },
    /// Inner signature carrying custom modifiers
    Modified {
        /// The modifiers, innermost last
        modifiers: Vec<CustomModifierSym>,
        /// The unmodified signature
        inner: Box<TypeSig>,
    },
}

impl TypeSig {
    /// Convenience constructor for a named-type signature.
    #[must_use]
    pub fn named(ty: &NamedTypeRc) -> Self {
        TypeSig::Named(TypeHandle::new(ty))
    }

    /// Produces the canonical structural key for this signature.
    ///
    /// Keys are what the cross-universe matcher compares: two signatures
    /// from independently represented universes are structurally equal
    /// exactly when their keys are equal.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            TypeSig::Primitive(kind) => kind.fully_qualified_name().to_string(),
            TypeSig::Named(handle) => match handle.upgrade() {
                Some(ty) => ty.structural_key(),
                None => "<dropped>".to_string(),
            },
            TypeSig::Pointer(inner) => format!("{}*", inner.key()),
            TypeSig::ByRef(inner) => format!("{}&", inner.key()),
            TypeSig::SzArray(inner) => format!("{}[]", inner.key()),
            TypeSig::TypeParam { index, method } => {
                if *method {
                    format!("!!{index}")
                } else {
                    format!("!{index}")
                }
            }
            TypeSig::Modified { modifiers, inner } => {
                let mut key = inner.key();
                for modifier in modifiers {
                    let name = modifier
                        .modifier_type
                        .upgrade()
                        .map_or_else(|| "<dropped>".to_string(), |t| t.structural_key());
                    let marker = if modifier.required { "modreq" } else { "modopt" };
                    key = format!("{key} {marker}({name})");
                }
                key
            }
        }
    }

    /// Returns true if the signature carries custom modifiers at its top
    /// level.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        matches!(self, TypeSig::Modified { .. })
    }
}

/// A named type symbol.
///
/// See the module docs for the definition / generic instance / specialized
/// nested trichotomy. Member lists are append-only and populated by the
/// builders; the symbol itself is immutable once constructed.
pub struct NamedTypeSymbol {
    id: SymbolId,
    /// Simple source name (no arity suffix)
    pub name: String,
    /// Namespace, empty for nested types
    pub namespace: String,
    /// Metadata attributes
    pub attributes: TypeAttributes,
    /// Locally embedded interop type (cannot be added after generation 0)
    pub is_embedded_interop: bool,
    /// Structurally generated anonymous type
    pub is_anonymous: bool,
    /// Declared generic parameter names, in declaration order
    pub type_parameters: Vec<String>,
    /// Type arguments, non-empty exactly for generic instances
    pub type_arguments: Vec<TypeSig>,
    /// Optional base type
    pub base: Option<TypeHandle>,
    /// Module the type is declared in; `None` means the module currently
    /// being emitted
    pub containing_module: Option<ModuleRc>,
    pub(crate) original_definition: Option<NamedTypeRc>,
    pub(crate) containing_type: Option<NamedTypeRc>,
    /// Fields declared on (or specialized into) this type
    pub fields: boxcar::Vec<FieldRc>,
    /// Methods declared on (or specialized into) this type
    pub methods: boxcar::Vec<MethodRc>,
}

impl NamedTypeSymbol {
    pub(crate) fn new_definition(
        universe: &SymbolUniverse,
        name: String,
        namespace: String,
        attributes: TypeAttributes,
        is_embedded_interop: bool,
        is_anonymous: bool,
        type_parameters: Vec<String>,
        base: Option<TypeHandle>,
        containing_module: Option<ModuleRc>,
        containing_type: Option<NamedTypeRc>,
    ) -> NamedTypeRc {
        Arc::new(Self {
            id: universe.allocate_id(),
            name,
            namespace,
            attributes,
            is_embedded_interop,
            is_anonymous,
            type_parameters,
            type_arguments: Vec::new(),
            base,
            containing_module,
            original_definition: None,
            containing_type,
            fields: boxcar::Vec::new(),
            methods: boxcar::Vec::new(),
        })
    }

    /// Returns the per-universe symbol id.
    #[must_use]
    pub fn id(&self) -> SymbolId {
        self.id
    }

    /// Generic arity (number of declared type parameters).
    #[must_use]
    pub fn arity(&self) -> u16 {
        self.type_parameters.len() as u16
    }

    /// Metadata name: simple name with the backtick arity suffix.
    #[must_use]
    pub fn metadata_name(&self) -> String {
        if self.type_parameters.is_empty() {
            self.name.clone()
        } else {
            format!("{}`{}", self.name, self.type_parameters.len())
        }
    }

    /// Returns true for definitions (not instances, not specialized views).
    #[must_use]
    pub fn is_definition(&self) -> bool {
        self.original_definition.is_none()
    }

    /// Returns true for generic instances (closed over type arguments).
    #[must_use]
    pub fn is_generic_instance(&self) -> bool {
        !self.type_arguments.is_empty()
    }

    /// Returns true if this type is nested inside another type.
    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.containing_type.is_some()
    }

    /// Returns the immediate containing type, if nested.
    #[must_use]
    pub fn containing_type(&self) -> Option<&NamedTypeRc> {
        self.containing_type.as_ref()
    }

    /// Returns the definition this symbol is a view of; a definition
    /// returns itself.
    #[must_use]
    pub fn original_definition(self: &NamedTypeRc) -> NamedTypeRc {
        self.original_definition
            .clone()
            .unwrap_or_else(|| self.clone())
    }

    /// Returns true if the immediate container is an instantiation or a
    /// specialized view (rather than a plain definition).
    #[must_use]
    pub fn has_instantiated_container(&self) -> bool {
        self.containing_type
            .as_ref()
            .is_some_and(|c| !c.is_definition())
    }

    /// Fully-qualified metadata name of the underlying definition, with `+`
    /// separators for nesting: `Ns.Outer`1+Inner`. Type arguments are not
    /// included; use [`NamedTypeSymbol::structural_key`] for that.
    #[must_use]
    pub fn fully_qualified_name(&self) -> String {
        let mut segments = vec![self.metadata_name()];
        let mut current = self.containing_type.clone();
        while let Some(container) = current {
            segments.push(container.metadata_name());
            current = container.containing_type.clone();
        }
        segments.reverse();

        // The namespace belongs to the outermost segment.
        let outer_namespace = self.outermost_namespace();
        let chain = segments.join("+");
        if outer_namespace.is_empty() {
            chain
        } else {
            format!("{outer_namespace}.{chain}")
        }
    }

    fn outermost_namespace(&self) -> String {
        let mut current = match &self.containing_type {
            None => return self.namespace.clone(),
            Some(container) => container.clone(),
        };
        loop {
            let next = match &current.containing_type {
                Some(container) => container.clone(),
                None => return current.namespace.clone(),
            };
            current = next;
        }
    }

    /// Canonical structural key including type arguments, used for
    /// cross-universe matching.
    #[must_use]
    pub fn structural_key(&self) -> String {
        // A non-definition container contributes its arguments to the key.
        let mut key = match &self.containing_type {
            Some(container) if !container.is_definition() => {
                format!("{}+{}", container.structural_key(), self.metadata_name())
            }
            _ => self.fully_qualified_name(),
        };
        if !self.type_arguments.is_empty() {
            let args: Vec<String> = self.type_arguments.iter().map(TypeSig::key).collect();
            key.push('<');
            key.push_str(&args.join(","));
            key.push('>');
        }
        key
    }

    /// Creates a generic instance of this type closed over `args`.
    ///
    /// Valid on definitions and on specialized nested views; the latter
    /// yields the instance-inside-instantiated-container shape
    /// (`Outer<string>.Inner<int>`).
    ///
    /// # Panics
    ///
    /// Panics if the type is already closed over arguments or `args` does
    /// not match the arity; both are programmer errors on the caller's side
    /// of the Symbol contract.
    #[must_use]
    pub fn instantiate(
        self: &NamedTypeRc,
        universe: &SymbolUniverse,
        args: Vec<TypeSig>,
    ) -> NamedTypeRc {
        assert!(
            self.type_arguments.is_empty(),
            "instantiate of already-instantiated type '{}'",
            self.fully_qualified_name()
        );
        assert_eq!(
            args.len(),
            self.type_parameters.len(),
            "instantiate of '{}' with wrong argument count",
            self.fully_qualified_name()
        );

        let instance = Arc::new(NamedTypeSymbol {
            id: universe.allocate_id(),
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            attributes: self.attributes,
            is_embedded_interop: self.is_embedded_interop,
            is_anonymous: self.is_anonymous,
            type_parameters: self.type_parameters.clone(),
            type_arguments: args,
            base: self.base.clone(),
            containing_module: self.containing_module.clone(),
            original_definition: Some(self.clone().original_definition()),
            containing_type: self.containing_type.clone(),
            fields: boxcar::Vec::new(),
            methods: boxcar::Vec::new(),
        });

        Self::specialize_members(self, &instance, universe);
        instance
    }

    /// Creates the specialized view of this nested definition inside an
    /// instantiated (or itself specialized) container.
    ///
    /// # Panics
    ///
    /// Panics if this symbol is not a nested definition, or if `container`
    /// is not a view of this symbol's declared containing type.
    #[must_use]
    pub fn specialize_in(
        self: &NamedTypeRc,
        universe: &SymbolUniverse,
        container: &NamedTypeRc,
    ) -> NamedTypeRc {
        assert!(
            self.is_definition() && self.is_nested(),
            "specialize_in requires a nested definition, got '{}'",
            self.fully_qualified_name()
        );
        let declared = self
            .containing_type
            .as_ref()
            .expect("nested definition has a container");
        assert!(
            Arc::ptr_eq(&container.clone().original_definition(), declared),
            "container is not a view of '{}'",
            declared.fully_qualified_name()
        );

        let specialized = Arc::new(NamedTypeSymbol {
            id: universe.allocate_id(),
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            attributes: self.attributes,
            is_embedded_interop: self.is_embedded_interop,
            is_anonymous: self.is_anonymous,
            type_parameters: self.type_parameters.clone(),
            type_arguments: Vec::new(),
            base: self.base.clone(),
            containing_module: self.containing_module.clone(),
            original_definition: Some(self.clone()),
            containing_type: Some(container.clone()),
            fields: boxcar::Vec::new(),
            methods: boxcar::Vec::new(),
        });

        Self::specialize_members(self, &specialized, universe);
        specialized
    }

    fn specialize_members(
        definition: &NamedTypeRc,
        view: &NamedTypeRc,
        universe: &SymbolUniverse,
    ) {
        for (_, field) in definition.fields.iter() {
            view.fields.push(field.specialize(universe, view));
        }
        for (_, method) in definition.methods.iter() {
            view.methods.push(method.specialize(universe, view));
        }
    }

    /// Finds a declared method by name.
    #[must_use]
    pub fn find_method(&self, name: &str) -> Option<MethodRc> {
        self.methods
            .iter()
            .map(|(_, m)| m)
            .find(|m| m.name == name)
            .cloned()
    }

    /// Finds a declared field by name.
    #[must_use]
    pub fn find_field(&self, name: &str) -> Option<FieldRc> {
        self.fields
            .iter()
            .map(|(_, f)| f)
            .find(|f| f.name == name)
            .cloned()
    }
}

impl fmt::Debug for NamedTypeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NamedTypeSymbol({})", self.structural_key())
    }
}
