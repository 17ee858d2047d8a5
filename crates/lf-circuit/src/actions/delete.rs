use lf_core::{CompId, WireId};

use crate::designer::Designer;
use crate::error::CircuitResult;

use super::{Disconnect, GroupAction, RemoveComponent, Select};

/// Build the composite that deletes `comps`: deselect the selected ones,
/// disconnect every wire touching any of them, then remove them.
///
/// Nothing is executed; the caller runs the group (usually through
/// [`crate::History::perform`]).
pub fn delete_group(designer: &Designer, comps: &[CompId]) -> CircuitResult<GroupAction> {
    let mut wires: Vec<WireId> = Vec::new();
    for comp in comps {
        wires.extend(designer.circuit().incident_wires(*comp)?);
    }
    wires.sort();
    wires.dedup();

    let mut unique: Vec<CompId> = Vec::with_capacity(comps.len());
    for comp in comps {
        if !unique.contains(comp) {
            unique.push(*comp);
        }
    }

    let mut group = GroupAction::named(match unique.len() {
        1 => "Deleted Component".to_string(),
        n => format!("Deleted {n} Components"),
    });
    for comp in &unique {
        if designer.is_selected(*comp) {
            group.push(Select::deselect(*comp));
        }
    }
    for wire in wires {
        group.push(Disconnect::new(designer, wire)?);
    }
    for comp in unique {
        group.push(RemoveComponent::new(designer, comp)?);
    }
    Ok(group)
}
