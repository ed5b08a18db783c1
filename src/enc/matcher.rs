//! Cross-universe structural symbol matching.
//!
//! The delta builder compares symbols from two independently represented
//! universes: the current compilation's and a previous generation's (either
//! decoded from the baseline module's bytes or retained from the previous
//! in-memory compilation). Node identity is meaningless across that
//! boundary, so matching is purely structural: definitions match by
//! fully-qualified metadata name and arity, members by canonical signature
//! key within their matched container, instances by matching the definition
//! and every argument.
//!
//! A successful match returns the counterpart node in the target universe;
//! `None` means "no counterpart", which for an update edit is a
//! user-reachable condition, not a programmer error.

use std::sync::Arc;

use crate::enc::baseline::EmitBaseline;
use crate::symbols::{
    EventRc, EventSymbol, FieldRc, MethodRc, NamedTypeRc, PropertyRc, PropertySymbol, SymbolRef,
    SymbolUniverse, TypeHandle, TypeSig,
};

/// Matches symbols of one universe onto their structural counterparts in a
/// target universe.
pub struct SymbolMatcher {
    target: Arc<SymbolUniverse>,
}

impl SymbolMatcher {
    /// Creates a matcher resolving into `target`.
    #[must_use]
    pub fn new(target: &Arc<SymbolUniverse>) -> Self {
        Self {
            target: target.clone(),
        }
    }

    /// Creates a matcher resolving into a generation-0 baseline's universe,
    /// the one decoded from the running module's bytes.
    #[must_use]
    pub fn against_baseline(baseline: &EmitBaseline) -> Self {
        Self::new(baseline.universe())
    }

    /// Creates a matcher resolving into a later generation's universe, the
    /// one retained from the previous in-memory compilation.
    #[must_use]
    pub fn against_previous_generation(previous: &EmitBaseline) -> Self {
        Self::new(previous.universe())
    }

    /// Matches any symbol kind. Assembly and module symbols are container
    /// identities, not structural shapes, and never match.
    #[must_use]
    pub fn map_symbol(&self, symbol: &SymbolRef) -> Option<SymbolRef> {
        match symbol {
            SymbolRef::NamedType(ty) => self.map_type(ty).map(SymbolRef::NamedType),
            SymbolRef::Method(method) => self.map_method(method).map(SymbolRef::Method),
            SymbolRef::Field(field) => self.map_field(field).map(SymbolRef::Field),
            SymbolRef::Property(property) => self.map_property(property).map(SymbolRef::Property),
            SymbolRef::Event(event) => self.map_event(event).map(SymbolRef::Event),
            SymbolRef::Assembly(_) | SymbolRef::Module(_) => None,
        }
    }

    /// Matches a named type: definitions by name and arity, views by
    /// rebuilding the view over the matched definition.
    #[must_use]
    pub fn map_type(&self, ty: &NamedTypeRc) -> Option<NamedTypeRc> {
        if ty.is_definition() {
            let candidate = self.target.get_by_fullname(&ty.fully_qualified_name())?;
            return (candidate.arity() == ty.arity()).then_some(candidate);
        }

        let definition = self.map_type(&ty.original_definition())?;

        // A specialized view is rebuilt inside its matched container first.
        let definition = match ty.containing_type() {
            Some(container) if !container.is_definition() => {
                let mapped_container = self.map_type(container)?;
                definition.specialize_in(&self.target, &mapped_container)
            }
            _ => definition,
        };

        if ty.is_generic_instance() {
            let args = self.map_args(&ty.type_arguments)?;
            return Some(definition.instantiate(&self.target, args));
        }
        Some(definition)
    }

    /// Matches a method by signature key within its matched container.
    #[must_use]
    pub fn map_method(&self, method: &MethodRc) -> Option<MethodRc> {
        let container = self.map_type(&method.containing_type.upgrade()?)?;
        let key = method.signature_key();

        if method.is_generic_instance() {
            let definition_key = method.clone().original_definition().signature_key();
            let counterpart = self.find_method_by_key(&container, &definition_key)?;
            let args = self.map_args(&method.type_arguments)?;
            return Some(counterpart.instantiate(&self.target, args));
        }
        self.find_method_by_key(&container, &key)
    }

    fn find_method_by_key(&self, container: &NamedTypeRc, key: &str) -> Option<MethodRc> {
        container
            .methods
            .iter()
            .map(|(_, m)| m)
            .find(|m| m.signature_key() == key)
            .cloned()
    }

    /// Matches a field by signature key within its matched container.
    #[must_use]
    pub fn map_field(&self, field: &FieldRc) -> Option<FieldRc> {
        let container = self.map_type(&field.containing_type.upgrade()?)?;
        let key = field.signature_key();
        container
            .fields
            .iter()
            .map(|(_, f)| f)
            .find(|f| f.signature_key() == key)
            .cloned()
    }

    /// Matches a property by name and type key within its matched container.
    ///
    /// Containers do not own property symbols directly in this model, so a
    /// match rebuilds the property over the matched container.
    #[must_use]
    pub fn map_property(&self, property: &PropertyRc) -> Option<PropertyRc> {
        let container = self.map_type(&property.containing_type.upgrade()?)?;
        let property_type = self.map_sig(&property.property_type)?;
        Some(PropertySymbol::new(
            &self.target,
            property.name.clone(),
            property_type,
            &container,
        ))
    }

    /// Matches an event by name and type key within its matched container.
    #[must_use]
    pub fn map_event(&self, event: &EventRc) -> Option<EventRc> {
        let container = self.map_type(&event.containing_type.upgrade()?)?;
        let event_type = self.map_sig(&event.event_type)?;
        Some(EventSymbol::new(
            &self.target,
            event.name.clone(),
            event_type,
            &container,
        ))
    }

    /// Matches a signature shape by rebuilding it over matched named types.
    #[must_use]
    pub fn map_sig(&self, sig: &TypeSig) -> Option<TypeSig> {
        match sig {
            TypeSig::Primitive(kind) => Some(TypeSig::Primitive(*kind)),
            TypeSig::Named(handle) => {
                let mapped = self.map_type(&handle.upgrade()?)?;
                Some(TypeSig::Named(TypeHandle::new(&mapped)))
            }
            TypeSig::Pointer(inner) => Some(TypeSig::Pointer(Box::new(self.map_sig(inner)?))),
            TypeSig::ByRef(inner) => Some(TypeSig::ByRef(Box::new(self.map_sig(inner)?))),
            TypeSig::SzArray(inner) => Some(TypeSig::SzArray(Box::new(self.map_sig(inner)?))),
            TypeSig::TypeParam { index, method } => Some(TypeSig::TypeParam {
                index: *index,
                method: *method,
            }),
            TypeSig::Modified { modifiers, inner } => {
                let mapped_modifiers = modifiers
                    .iter()
                    .map(|modifier| {
                        let ty = self.map_type(&modifier.modifier_type.upgrade()?)?;
                        Some(crate::symbols::CustomModifierSym {
                            required: modifier.required,
                            modifier_type: TypeHandle::new(&ty),
                        })
                    })
                    .collect::<Option<Vec<_>>>()?;
                Some(TypeSig::Modified {
                    modifiers: mapped_modifiers,
                    inner: Box::new(self.map_sig(inner)?),
                })
            }
        }
    }

    fn map_args(&self, args: &[TypeSig]) -> Option<Vec<TypeSig>> {
        args.iter().map(|arg| self.map_sig(arg)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{
        FieldSymbolBuilder, MethodSymbolBuilder, ParameterSymbol, PrimitiveKind, SymbolUniverse,
        TypeSymbolBuilder,
    };
    use std::sync::Arc;

    /// Builds structurally identical graphs in two universes, mimicking a
    /// decoded baseline and a live compilation.
    fn twin_universes() -> (Arc<SymbolUniverse>, Arc<SymbolUniverse>) {
        let build = |u: &Arc<SymbolUniverse>| {
            let outer = TypeSymbolBuilder::new(u)
                .namespace("Demo")
                .name("Outer")
                .type_parameter("T")
                .build();
            let _inner = TypeSymbolBuilder::new(u)
                .name("Inner")
                .containing_type(&outer)
                .build();
            let _field = FieldSymbolBuilder::new(u)
                .name("_count")
                .field_type(TypeSig::Primitive(PrimitiveKind::I4))
                .build(&outer);
            let _method = MethodSymbolBuilder::new(u)
                .name("Add")
                .parameter(ParameterSymbol::new(
                    "item",
                    TypeSig::TypeParam { index: 0, method: false },
                ))
                .returns(TypeSig::Primitive(PrimitiveKind::Void))
                .build(&outer);
        };
        let old = Arc::new(SymbolUniverse::new());
        let new = Arc::new(SymbolUniverse::new());
        build(&old);
        build(&new);
        (old, new)
    }

    #[test]
    fn test_definition_matches_by_name_and_arity() {
        let (old, new) = twin_universes();
        let matcher = SymbolMatcher::new(&old);

        let new_outer = new.get_by_fullname("Demo.Outer`1").unwrap();
        let matched = matcher.map_type(&new_outer).unwrap();

        assert_eq!(matched.fully_qualified_name(), "Demo.Outer`1");
        assert!(!Arc::ptr_eq(&matched, &new_outer));
    }

    #[test]
    fn test_nested_definition_matches() {
        let (old, new) = twin_universes();
        let matcher = SymbolMatcher::new(&old);

        let new_inner = new.get_by_fullname("Demo.Outer`1+Inner").unwrap();
        let matched = matcher.map_type(&new_inner).unwrap();
        assert_eq!(matched.fully_qualified_name(), "Demo.Outer`1+Inner");
    }

    #[test]
    fn test_instance_matches_structurally() {
        let (old, new) = twin_universes();
        let matcher = SymbolMatcher::new(&old);

        let new_outer = new.get_by_fullname("Demo.Outer`1").unwrap();
        let instance = new_outer.instantiate(&new, vec![TypeSig::Primitive(PrimitiveKind::String)]);

        let matched = matcher.map_type(&instance).unwrap();
        assert_eq!(matched.structural_key(), instance.structural_key());
    }

    #[test]
    fn test_member_matching_within_container() {
        let (old, new) = twin_universes();
        let matcher = SymbolMatcher::new(&old);

        let new_outer = new.get_by_fullname("Demo.Outer`1").unwrap();
        let new_method = new_outer.find_method("Add").unwrap();
        let new_field = new_outer.find_field("_count").unwrap();

        let matched_method = matcher.map_method(&new_method).unwrap();
        assert_eq!(matched_method.signature_key(), new_method.signature_key());

        let matched_field = matcher.map_field(&new_field).unwrap();
        assert_eq!(matched_field.signature_key(), new_field.signature_key());
    }

    #[test]
    fn test_missing_counterpart_is_none() {
        let (old, new) = twin_universes();
        let matcher = SymbolMatcher::new(&old);

        let added = TypeSymbolBuilder::new(&new)
            .namespace("Demo")
            .name("Freshly")
            .build();
        assert!(matcher.map_type(&added).is_none());

        let new_outer = new.get_by_fullname("Demo.Outer`1").unwrap();
        let added_method = MethodSymbolBuilder::new(&new)
            .name("Remove")
            .returns(TypeSig::Primitive(PrimitiveKind::Boolean))
            .build(&new_outer);
        assert!(matcher.map_method(&added_method).is_none());
    }

    #[test]
    fn test_arity_mismatch_is_none() {
        let old = Arc::new(SymbolUniverse::new());
        let new = Arc::new(SymbolUniverse::new());
        let _old_ty = TypeSymbolBuilder::new(&old).namespace("Demo").name("C").build();
        // Same metadata name cannot collide here: arity changes the name.
        let new_ty = TypeSymbolBuilder::new(&new)
            .namespace("Demo")
            .name("C")
            .type_parameter("T")
            .build();

        let matcher = SymbolMatcher::new(&old);
        assert!(matcher.map_type(&new_ty).is_none());
    }

    #[test]
    fn test_specialized_view_matches_through_container() {
        let (old, new) = twin_universes();
        let matcher = SymbolMatcher::new(&old);

        let new_outer = new.get_by_fullname("Demo.Outer`1").unwrap();
        let new_inner = new.get_by_fullname("Demo.Outer`1+Inner").unwrap();
        let outer_string =
            new_outer.instantiate(&new, vec![TypeSig::Primitive(PrimitiveKind::String)]);
        let inner_view = new_inner.specialize_in(&new, &outer_string);

        let matched = matcher.map_type(&inner_view).unwrap();
        assert_eq!(matched.structural_key(), "Demo.Outer`1<System.String>+Inner");
    }
}
