//! The closed reference union and its payload shapes.
//!
//! A [`MetadataRef`] is what translation produces: an in-memory value
//! carrying exactly the fields a table-based metadata serializer needs.
//! Table writers `match` on the union exhaustively; adding a variant is a
//! breaking change by design of the ECMA-335 reference space, which is
//! itself closed.
//!
//! Named types split across six variants along two axes (is the type
//! itself an instantiation, is its container an instantiation); methods
//! split across four; fields across two. Signature-only shapes (primitive,
//! pointer, by-ref, array, generic parameter) are also variants so a whole
//! signature is expressible as one recursive value.

use crate::metadata::identity::AssemblyIdentity;
use crate::symbols::PrimitiveKind;

/// Where a top-level type reference resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionScope {
    /// The module currently being emitted
    CurrentModule,
    /// Another assembly
    Assembly(AssemblyRefData),
    /// Another module of the assembly being built
    Module(ModuleRefData),
}

/// Payload of an assembly reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyRefData {
    /// Full identity of the referenced assembly
    pub identity: AssemblyIdentity,
}

/// Payload of a module reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRefData {
    /// Module file name
    pub name: String,
}

/// Payload of a top-level (namespace) type reference.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefData {
    /// Resolution scope of the reference
    pub scope: ResolutionScope,
    /// Namespace, possibly empty
    pub namespace: String,
    /// Metadata name including the arity suffix
    pub name: String,
    /// Generic arity of the definition
    pub arity: u16,
}

/// Payload of a nested type reference; the container is itself a full
/// reference, so `Outer<string>.Inner` carries its container's arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedTypeData {
    /// Reference to the immediate container
    pub container: Box<MetadataRef>,
    /// Metadata name including the arity suffix
    pub name: String,
    /// Generic arity of the nested definition itself
    pub arity: u16,
}

/// Payload of a generic type instantiation.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeInstanceData {
    /// Reference to the definition being instantiated
    pub definition: Box<MetadataRef>,
    /// Type arguments in declaration order
    pub arguments: Vec<MetadataRef>,
}

/// Calling-convention bits carried on method references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallingConvention {
    /// Instance method (implicit `this`)
    pub has_this: bool,
    /// `this` is explicit in the parameter list
    pub explicit_this: bool,
    /// Generic arity encoded in the convention
    pub generic_arity: u16,
    /// Variable-argument convention
    pub vararg: bool,
}

impl CallingConvention {
    /// Convention for a static, non-generic, fixed-arg method.
    #[must_use]
    pub fn static_default() -> Self {
        Self {
            has_this: false,
            explicit_this: false,
            generic_arity: 0,
            vararg: false,
        }
    }
}

/// Payload of a method reference.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodRefData {
    /// Reference to the containing type
    pub container: Box<MetadataRef>,
    /// Method name
    pub name: String,
    /// Generic arity of the method itself
    pub arity: u16,
    /// Calling convention
    pub calling_convention: CallingConvention,
    /// Parameters in declaration order
    pub parameters: Vec<ParamData>,
    /// Return type reference
    pub return_type: Box<MetadataRef>,
}

/// Payload of a generic method instantiation.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInstanceData {
    /// Reference to the method definition (possibly specialized)
    pub definition: Box<MetadataRef>,
    /// Method type arguments in declaration order
    pub arguments: Vec<MetadataRef>,
}

/// Payload of a field reference.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRefData {
    /// Reference to the containing type
    pub container: Box<MetadataRef>,
    /// Field name
    pub name: String,
    /// Declared field type reference
    pub field_type: Box<MetadataRef>,
}

/// One parameter of a method reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamData {
    /// Parameter name, if declared
    pub name: Option<String>,
    /// Parameter type reference
    pub param_type: Box<MetadataRef>,
    /// Passed by managed reference
    pub by_ref: bool,
    /// Custom modifiers on the parameter
    pub modifiers: Vec<CustomModifierData>,
}

/// One custom modifier on a signature.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomModifierData {
    /// Required (`modreq`) vs. optional (`modopt`)
    pub required: bool,
    /// Reference to the modifier type
    pub modifier: Box<MetadataRef>,
}

/// A type reference wrapped in custom modifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifiedTypeData {
    /// The modifiers, innermost last
    pub modifiers: Vec<CustomModifierData>,
    /// The unmodified reference
    pub unmodified: Box<MetadataRef>,
}

/// The closed union of serializable reference shapes.
///
/// For the four specialized/instantiated method variants and the six named
/// type variants, the classification axes are:
///
/// | variant | self instantiated | container instantiated |
/// |---|---|---|
/// | `NamespaceTypeDef` / `NestedTypeDef` / `Method` / `Field` | no | no |
/// | `NamespaceTypeInstance` / `NestedTypeInstance` / `MethodInstance` | yes | no |
/// | `SpecializedNestedType` / `SpecializedMethod` / `SpecializedField` | no | yes |
/// | `SpecializedNestedTypeInstance` / `SpecializedMethodInstance` | yes | yes |
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataRef {
    /// An assembly reference
    Assembly(AssemblyRefData),
    /// A module reference
    Module(ModuleRefData),
    /// A non-generic or open top-level type definition reference
    NamespaceTypeDef(TypeDefData),
    /// A generic instantiation of a top-level type
    NamespaceTypeInstance(TypeInstanceData),
    /// A nested type definition reference with an uninstantiated container
    NestedTypeDef(NestedTypeData),
    /// A generic instantiation of a nested type whose container is a plain
    /// definition
    NestedTypeInstance(TypeInstanceData),
    /// A nested definition viewed through an instantiated container
    SpecializedNestedType(NestedTypeData),
    /// A generic instantiation of a nested type whose container is itself
    /// instantiated
    SpecializedNestedTypeInstance(TypeInstanceData),
    /// A method on an uninstantiated container
    Method(MethodRefData),
    /// A generic method instantiation on an uninstantiated container
    MethodInstance(MethodInstanceData),
    /// A method viewed through an instantiated container
    SpecializedMethod(MethodRefData),
    /// A generic method instantiation on an instantiated container
    SpecializedMethodInstance(MethodInstanceData),
    /// A field on an uninstantiated container
    Field(FieldRefData),
    /// A field viewed through an instantiated container
    SpecializedField(FieldRefData),
    /// A built-in primitive
    Primitive(PrimitiveKind),
    /// Unmanaged pointer to the inner reference
    Pointer(Box<MetadataRef>),
    /// Managed by-ref to the inner reference
    ByRef(Box<MetadataRef>),
    /// Single-dimensional, zero-based array of the inner reference
    SzArray(Box<MetadataRef>),
    /// Generic parameter position; `method` selects `!!n` over `!n`
    TypeParam {
        /// Zero-based parameter position
        index: u16,
        /// Method parameter (`!!n`) vs. type parameter (`!n`)
        method: bool,
    },
    /// A reference wrapped in custom modifiers
    ModifiedType(ModifiedTypeData),
}

impl MetadataRef {
    /// Returns the generic arguments of an instantiation variant, or the
    /// empty slice for everything else.
    #[must_use]
    pub fn generic_arguments(&self) -> &[MetadataRef] {
        match self {
            MetadataRef::NamespaceTypeInstance(data)
            | MetadataRef::NestedTypeInstance(data)
            | MetadataRef::SpecializedNestedTypeInstance(data) => &data.arguments,
            MetadataRef::MethodInstance(data) | MetadataRef::SpecializedMethodInstance(data) => {
                &data.arguments
            }
            _ => &[],
        }
    }

    /// Returns the definition operand of an instantiation variant.
    #[must_use]
    pub fn instantiation_definition(&self) -> Option<&MetadataRef> {
        match self {
            MetadataRef::NamespaceTypeInstance(data)
            | MetadataRef::NestedTypeInstance(data)
            | MetadataRef::SpecializedNestedTypeInstance(data) => Some(&data.definition),
            MetadataRef::MethodInstance(data) | MetadataRef::SpecializedMethodInstance(data) => {
                Some(&data.definition)
            }
            _ => None,
        }
    }

    /// Returns true for the named-type variants (not signature shapes, not
    /// members, not scopes).
    #[must_use]
    pub fn is_type_reference(&self) -> bool {
        matches!(
            self,
            MetadataRef::NamespaceTypeDef(_)
                | MetadataRef::NamespaceTypeInstance(_)
                | MetadataRef::NestedTypeDef(_)
                | MetadataRef::NestedTypeInstance(_)
                | MetadataRef::SpecializedNestedType(_)
                | MetadataRef::SpecializedNestedTypeInstance(_)
        )
    }

    /// Returns true for the method variants.
    #[must_use]
    pub fn is_method_reference(&self) -> bool {
        matches!(
            self,
            MetadataRef::Method(_)
                | MetadataRef::MethodInstance(_)
                | MetadataRef::SpecializedMethod(_)
                | MetadataRef::SpecializedMethodInstance(_)
        )
    }

    /// Returns true for the field variants.
    #[must_use]
    pub fn is_field_reference(&self) -> bool {
        matches!(self, MetadataRef::Field(_) | MetadataRef::SpecializedField(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::identity::{AssemblyIdentity, AssemblyVersion};

    fn corlib_scope() -> ResolutionScope {
        ResolutionScope::Assembly(AssemblyRefData {
            identity: AssemblyIdentity::new(
                "System.Runtime",
                AssemblyVersion::new(4, 0, 0, 0),
                None,
                None,
            ),
        })
    }

    #[test]
    fn test_generic_arguments_of_instance() {
        let list = MetadataRef::NamespaceTypeDef(TypeDefData {
            scope: corlib_scope(),
            namespace: "System.Collections.Generic".to_string(),
            name: "List`1".to_string(),
            arity: 1,
        });
        let list_int = MetadataRef::NamespaceTypeInstance(TypeInstanceData {
            definition: Box::new(list.clone()),
            arguments: vec![MetadataRef::Primitive(PrimitiveKind::I4)],
        });

        assert_eq!(list_int.generic_arguments().len(), 1);
        assert_eq!(list_int.instantiation_definition(), Some(&list));
        assert!(list_int.is_type_reference());
        assert!(list.generic_arguments().is_empty());
    }

    #[test]
    fn test_kind_predicates() {
        let def = MetadataRef::NamespaceTypeDef(TypeDefData {
            scope: ResolutionScope::CurrentModule,
            namespace: String::new(),
            name: "C".to_string(),
            arity: 0,
        });
        let field = MetadataRef::Field(FieldRefData {
            container: Box::new(def.clone()),
            name: "_value".to_string(),
            field_type: Box::new(MetadataRef::Primitive(PrimitiveKind::I4)),
        });

        assert!(def.is_type_reference());
        assert!(!def.is_method_reference());
        assert!(field.is_field_reference());
        assert!(!field.is_type_reference());
        assert!(field.instantiation_definition().is_none());
    }
}
