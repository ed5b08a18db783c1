//! Local-variable slot assignment and cross-generation remapping.
//!
//! The debugger's view of a suspended frame is a set of local slots; an
//! update that reorders or retypes slots breaks every live frame of the
//! edited method. Slot preservation therefore matches each new local to a
//! previous slot by declarator position (through the edit's
//! position-correlation function) and by type, keeps matched slot numbers,
//! and appends fresh slots after the previous method's highest slot.

use crate::enc::PositionMapFn;
use crate::symbols::LocalDefinition;

/// One local-variable slot as a generation remembers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSlot {
    /// Slot number in the method's local signature
    pub slot: u32,
    /// Local name, if not compiler-generated
    pub name: Option<String>,
    /// Canonical key of the local's type
    pub type_key: String,
    /// Source position of the declarator in the generation that assigned
    /// this slot
    pub position: u32,
}

/// Assigns fresh consecutive slots, used for inserted methods and for
/// updates that do not preserve locals.
#[must_use]
pub fn assign_slots(locals: &[LocalDefinition]) -> Vec<LocalSlot> {
    locals
        .iter()
        .enumerate()
        .map(|(slot, local)| LocalSlot {
            slot: slot as u32,
            name: local.name.clone(),
            type_key: local.sig.key(),
            position: local.position,
        })
        .collect()
}

/// Remaps the new body's locals against the previous generation's slots.
///
/// A new local keeps a previous slot exactly when the correlation function
/// maps its declarator position onto a previous declarator position whose
/// slot has the same type key. Everything else gets a fresh slot numbered
/// past the previous method's slots, so no live frame ever sees a slot
/// change type.
#[must_use]
pub fn remap_slots(
    previous: &[LocalSlot],
    locals: &[LocalDefinition],
    syntax_map: &PositionMapFn,
) -> Vec<LocalSlot> {
    let mut next_fresh = previous.iter().map(|s| s.slot + 1).max().unwrap_or(0);
    let mut taken = vec![false; previous.len()];

    locals
        .iter()
        .map(|local| {
            let type_key = local.sig.key();
            let matched = syntax_map(local.position).and_then(|old_position| {
                previous.iter().enumerate().find(|(i, slot)| {
                    !taken[*i] && slot.position == old_position && slot.type_key == type_key
                })
            });

            let slot = match matched {
                Some((i, slot)) => {
                    taken[i] = true;
                    slot.slot
                }
                None => {
                    let fresh = next_fresh;
                    next_fresh += 1;
                    fresh
                }
            };

            LocalSlot {
                slot,
                name: local.name.clone(),
                type_key,
                position: local.position,
            }
        })
        .collect()
}
