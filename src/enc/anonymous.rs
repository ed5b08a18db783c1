//! The anonymous-type registry shared across generations.
//!
//! Anonymous types are named positionally (`<>f__AnonymousType0`,
//! `<>f__AnonymousType1`, ...) and the runtime identifies a live instance by
//! that positional name, so two generations that both use "the anonymous
//! type with fields (Name, Age)" must agree on its index. The registry's
//! key is the ordered field-name list; indices are assigned once and never
//! reused, and the map only ever grows from one generation to the next.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;

use crate::symbols::{NamedTypeRc, SymbolUniverse};

/// The identity of an anonymous type: its ordered field names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnonymousTypeKey(Vec<String>);

impl AnonymousTypeKey {
    /// Creates a key from field names in declaration order.
    #[must_use]
    pub fn new(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(fields.into_iter().map(Into::into).collect())
    }

    /// The field names, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for AnonymousTypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.join(", "))
    }
}

/// The registered identity of an anonymous type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnonymousTypeValue {
    /// Positional index, assigned once, never reused
    pub index: u32,
    /// The generated metadata name
    pub name: String,
}

/// Frozen snapshot of the registry, as a baseline remembers it.
pub type AnonymousTypeMap = HashMap<AnonymousTypeKey, AnonymousTypeValue>;

/// The metadata name an anonymous type with positional index `index`
/// receives.
#[must_use]
pub fn anonymous_type_name(index: u32) -> String {
    format!("<>f__AnonymousType{index}")
}

/// The generic-parameter name generated for an anonymous-type field.
#[must_use]
pub fn anonymous_type_parameter_name(field: &str) -> String {
    format!("<{field}>j__TPar")
}

/// Parses an anonymous type's positional index back out of its metadata
/// name. Decoding a baseline from bytes recovers the registry this way.
#[must_use]
pub fn parse_anonymous_type_index(name: &str) -> Option<u32> {
    name.strip_prefix("<>f__AnonymousType")?.parse().ok()
}

/// Parses the field name back out of a generated generic-parameter name.
#[must_use]
pub fn parse_anonymous_type_parameter(name: &str) -> Option<&str> {
    name.strip_prefix('<')?.strip_suffix(">j__TPar")
}

/// The live, append-only anonymous-type registry of one compilation.
#[derive(Debug)]
pub struct AnonymousTypeManager {
    next_index: AtomicU32,
    map: DashMap<AnonymousTypeKey, AnonymousTypeValue>,
}

impl Default for AnonymousTypeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AnonymousTypeManager {
    /// Creates an empty registry; indices start at 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_index: AtomicU32::new(0),
            map: DashMap::new(),
        }
    }

    /// Seeds the registry from a previous generation's snapshot. Fresh
    /// indices continue past the highest seeded index.
    #[must_use]
    pub fn from_snapshot(snapshot: &AnonymousTypeMap) -> Self {
        let manager = Self::new();
        let mut highest = None;
        for (key, value) in snapshot {
            manager.map.insert(key.clone(), value.clone());
            highest = highest.max(Some(value.index));
        }
        if let Some(highest) = highest {
            manager.next_index.store(highest + 1, Ordering::Relaxed);
        }
        manager
    }

    /// Recovers the registry recorded in a decoded baseline universe by
    /// scanning its type names. A type matching the positional naming
    /// pattern but whose generic parameters do not follow the field-name
    /// convention is someone else's; it is left out.
    #[must_use]
    pub fn from_universe(universe: &SymbolUniverse) -> Self {
        let manager = Self::new();
        for ty in universe.types() {
            let Some(index) = parse_anonymous_type_index(&ty.name) else {
                continue;
            };
            let Some(key) = Self::key_of(&ty) else {
                continue;
            };
            manager.map.insert(
                key,
                AnonymousTypeValue {
                    index,
                    name: ty.name.clone(),
                },
            );
            let _ = manager
                .next_index
                .fetch_max(index + 1, Ordering::Relaxed);
        }
        manager
    }

    /// Recovers the registry key of a decoded anonymous type: one generic
    /// parameter per field, named `<{field}>j__TPar` in declaration order.
    #[must_use]
    pub fn key_of(ty: &NamedTypeRc) -> Option<AnonymousTypeKey> {
        ty.type_parameters
            .iter()
            .map(|param| parse_anonymous_type_parameter(param).map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(AnonymousTypeKey)
    }

    /// Looks the key up, registering it with the next free index if absent.
    #[must_use]
    pub fn get_or_register(&self, key: &AnonymousTypeKey) -> AnonymousTypeValue {
        if let Some(existing) = self.map.get(key) {
            return existing.clone();
        }
        // Two racing registrations of the same key resolve to whichever
        // entry landed; the losing index is burned, never reused.
        let index = self.next_index.fetch_add(1, Ordering::Relaxed);
        self.map
            .entry(key.clone())
            .or_insert_with(|| AnonymousTypeValue {
                index,
                name: anonymous_type_name(index),
            })
            .clone()
    }

    /// Looks the key up without registering.
    #[must_use]
    pub fn get(&self, key: &AnonymousTypeKey) -> Option<AnonymousTypeValue> {
        self.map.get(key).map(|v| v.clone())
    }

    /// Number of registered anonymous types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if no anonymous types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Freezes the registry into a snapshot for the next baseline.
    #[must_use]
    pub fn snapshot(&self) -> AnonymousTypeMap {
        self.map
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Checks the append-only contract against a previous snapshot: every
    /// previously registered key must still be present with the same index.
    #[must_use]
    pub fn is_superset_of(&self, previous: &AnonymousTypeMap) -> bool {
        previous.iter().all(|(key, value)| {
            self.map
                .get(key)
                .is_some_and(|current| current.index == value.index)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{FieldSymbolBuilder, SymbolUniverse, TypeSig, TypeSymbolBuilder};
    use std::sync::Arc;

    #[test]
    fn test_naming_templates() {
        assert_eq!(anonymous_type_name(0), "<>f__AnonymousType0");
        assert_eq!(anonymous_type_name(17), "<>f__AnonymousType17");
        assert_eq!(anonymous_type_parameter_name("Name"), "<Name>j__TPar");
        assert_eq!(parse_anonymous_type_index("<>f__AnonymousType3"), Some(3));
        assert_eq!(parse_anonymous_type_index("Widget"), None);
        assert_eq!(parse_anonymous_type_parameter("<Name>j__TPar"), Some("Name"));
        assert_eq!(parse_anonymous_type_parameter("T"), None);
    }

    #[test]
    fn test_registration_is_stable_per_key() {
        let manager = AnonymousTypeManager::new();
        let name_age = AnonymousTypeKey::new(["Name", "Age"]);
        let age_name = AnonymousTypeKey::new(["Age", "Name"]);

        let first = manager.get_or_register(&name_age);
        let again = manager.get_or_register(&name_age);
        let different = manager.get_or_register(&age_name);

        assert_eq!(first, again);
        assert_eq!(first.index, 0);
        assert_eq!(different.index, 1);
        assert_eq!(different.name, "<>f__AnonymousType1");
    }

    #[test]
    fn test_seeded_registry_continues_indices() {
        let manager = AnonymousTypeManager::new();
        let _ = manager.get_or_register(&AnonymousTypeKey::new(["A"]));
        let _ = manager.get_or_register(&AnonymousTypeKey::new(["B"]));

        let seeded = AnonymousTypeManager::from_snapshot(&manager.snapshot());
        let fresh = seeded.get_or_register(&AnonymousTypeKey::new(["C"]));

        assert_eq!(fresh.index, 2);
        assert_eq!(
            seeded.get(&AnonymousTypeKey::new(["A"])).unwrap().index,
            manager.get(&AnonymousTypeKey::new(["A"])).unwrap().index
        );
    }

    #[test]
    fn test_recovery_from_decoded_universe() {
        let u = Arc::new(SymbolUniverse::new());
        let anon = TypeSymbolBuilder::new(&u)
            .name("<>f__AnonymousType4")
            .type_parameter(anonymous_type_parameter_name("Name"))
            .anonymous()
            .build();
        let _ = FieldSymbolBuilder::new(&u)
            .name("Name")
            .field_type(TypeSig::TypeParam { index: 0, method: false })
            .build(&anon);
        let _ = TypeSymbolBuilder::new(&u).name("Widget").build();

        let manager = AnonymousTypeManager::from_universe(&u);
        assert_eq!(manager.len(), 1);

        // The key comes back from the generic-parameter names, not the
        // field rows.
        let recovered = manager.get(&AnonymousTypeKey::new(["Name"])).unwrap();
        assert_eq!(recovered.index, 4);

        // The next fresh registration continues past the recovered index.
        let fresh = manager.get_or_register(&AnonymousTypeKey::new(["Other"]));
        assert_eq!(fresh.index, 5);
    }

    #[test]
    fn test_recovery_skips_unconventional_parameters() {
        let u = Arc::new(SymbolUniverse::new());
        // Matches the positional naming pattern, but its parameter is an
        // ordinary `T`; no key can be recovered from it.
        let _ = TypeSymbolBuilder::new(&u)
            .name("<>f__AnonymousType0")
            .type_parameter("T")
            .build();

        let manager = AnonymousTypeManager::from_universe(&u);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_superset_check() {
        let manager = AnonymousTypeManager::new();
        let _ = manager.get_or_register(&AnonymousTypeKey::new(["A"]));
        let snapshot = manager.snapshot();

        let _ = manager.get_or_register(&AnonymousTypeKey::new(["B"]));
        assert!(manager.is_superset_of(&snapshot));

        let empty = AnonymousTypeManager::new();
        assert!(!empty.is_superset_of(&snapshot));
    }
}
