//! Semantic edit descriptions driving a delta generation.
//!
//! Each edit names symbols, never syntax: the position-correlation function
//! attached to an update is the only bridge back into source text, and it
//! exists solely so preserved local variables can be matched by declarator
//! position.

use std::fmt;
use std::sync::Arc;

use crate::symbols::SymbolRef;
use crate::Result;

/// Maps a character position in the new document to the corresponding
/// position in the previous generation's document, or `None` when the
/// construct did not exist before.
pub type PositionMapFn = Arc<dyn Fn(u32) -> Option<u32> + Send + Sync>;

/// The kind of change an edit describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticEditKind {
    /// A definition that did not exist in the previous generation
    Insert,
    /// An existing definition whose body or signature-neutral parts changed
    Update,
    /// A definition removed from source (its metadata rows are never
    /// retired, only recorded as deleted)
    Delete,
}

impl fmt::Display for SemanticEditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticEditKind::Insert => write!(f, "insert"),
            SemanticEditKind::Update => write!(f, "update"),
            SemanticEditKind::Delete => write!(f, "delete"),
        }
    }
}

/// One semantic edit between the previous generation and the current
/// compilation.
///
/// `old_symbol` lives in the previous generation's universe, `new_symbol`
/// in the current one; which operands are required depends on the kind and
/// is checked by [`SemanticEdit::validate`].
#[derive(Clone)]
pub struct SemanticEdit {
    /// What kind of change this is
    pub kind: SemanticEditKind,
    /// The symbol in the previous generation, for updates and deletes
    pub old_symbol: Option<SymbolRef>,
    /// The symbol in the current compilation, for inserts and updates
    pub new_symbol: Option<SymbolRef>,
    /// Carry local variable slots over from the previous method body
    pub preserve_local_variables: bool,
    /// Position correlation for preserved locals
    pub syntax_map: Option<PositionMapFn>,
}

impl SemanticEdit {
    /// Describes a definition added in this generation.
    #[must_use]
    pub fn insert(new_symbol: SymbolRef) -> Self {
        Self {
            kind: SemanticEditKind::Insert,
            old_symbol: None,
            new_symbol: Some(new_symbol),
            preserve_local_variables: false,
            syntax_map: None,
        }
    }

    /// Describes an update to an existing definition, without preserving
    /// local slots.
    #[must_use]
    pub fn update(old_symbol: SymbolRef, new_symbol: SymbolRef) -> Self {
        Self {
            kind: SemanticEditKind::Update,
            old_symbol: Some(old_symbol),
            new_symbol: Some(new_symbol),
            preserve_local_variables: false,
            syntax_map: None,
        }
    }

    /// Describes a deletion of an existing definition.
    #[must_use]
    pub fn delete(old_symbol: SymbolRef) -> Self {
        Self {
            kind: SemanticEditKind::Delete,
            old_symbol: Some(old_symbol),
            new_symbol: None,
            preserve_local_variables: false,
            syntax_map: None,
        }
    }

    /// Requests local-slot preservation through `syntax_map`.
    #[must_use]
    pub fn with_preserved_locals(mut self, syntax_map: PositionMapFn) -> Self {
        self.preserve_local_variables = true;
        self.syntax_map = Some(syntax_map);
        self
    }

    /// Checks the operand shape the kind requires.
    pub fn validate(&self) -> Result<()> {
        match self.kind {
            SemanticEditKind::Insert => {
                if self.old_symbol.is_some() || self.new_symbol.is_none() {
                    return Err(invariant_error!(
                        "insert edit requires exactly a new symbol"
                    ));
                }
            }
            SemanticEditKind::Update => {
                if self.old_symbol.is_none() || self.new_symbol.is_none() {
                    return Err(invariant_error!(
                        "update edit requires both an old and a new symbol"
                    ));
                }
            }
            SemanticEditKind::Delete => {
                if self.old_symbol.is_none() || self.new_symbol.is_some() {
                    return Err(invariant_error!(
                        "delete edit requires exactly an old symbol"
                    ));
                }
            }
        }
        if self.preserve_local_variables && self.syntax_map.is_none() {
            return Err(invariant_error!(
                "preserving locals requires a position-correlation function"
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for SemanticEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .new_symbol
            .as_ref()
            .or(self.old_symbol.as_ref())
            .map_or("<none>", SymbolRef::name);
        write!(f, "SemanticEdit({} '{}')", self.kind, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{SymbolUniverse, TypeSymbolBuilder};
    use std::sync::Arc;

    #[test]
    fn test_edit_operand_validation() {
        let u = Arc::new(SymbolUniverse::new());
        let ty = TypeSymbolBuilder::new(&u).name("C").build();
        let symbol = SymbolRef::NamedType(ty);

        assert!(SemanticEdit::insert(symbol.clone()).validate().is_ok());
        assert!(SemanticEdit::update(symbol.clone(), symbol.clone())
            .validate()
            .is_ok());
        assert!(SemanticEdit::delete(symbol.clone()).validate().is_ok());

        let malformed = SemanticEdit {
            kind: SemanticEditKind::Update,
            old_symbol: None,
            new_symbol: Some(symbol),
            preserve_local_variables: false,
            syntax_map: None,
        };
        assert!(malformed.validate().is_err());
    }

    #[test]
    fn test_preserved_locals_require_map() {
        let u = Arc::new(SymbolUniverse::new());
        let ty = TypeSymbolBuilder::new(&u).name("C").build();
        let symbol = SymbolRef::NamedType(ty);

        let mut edit = SemanticEdit::update(symbol.clone(), symbol);
        edit.preserve_local_variables = true;
        assert!(edit.validate().is_err());

        let edit = edit.with_preserved_locals(Arc::new(Some));
        assert!(edit.validate().is_ok());
    }
}
