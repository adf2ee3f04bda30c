use crate::store::{read_json, write_json, StateStore};
use super::config::load_roster;
use super::eligibility::Position;
use super::types::{Assignments, SlotType};

pub const ASSIGN_KEY: &str = "assignments";

/// Loads the assignment table; a missing or malformed value is an empty table
pub fn load_assignments<S: StateStore + ?Sized>(store: &S) -> Assignments {
    read_json(store, ASSIGN_KEY).unwrap_or_default()
}

pub fn save_assignments<S: StateStore + ?Sized>(store: &mut S, assignments: &Assignments) {
    write_json(store, ASSIGN_KEY, assignments);
}

/// Places `player` in the first eligible slot with room.
///
/// Walks the position's eligibility order and appends to the first slot type whose
/// occupant count is below its configured capacity. Returns the slot taken, or `None`
/// (with nothing written) when every eligible slot is full.
pub fn try_assign_player<S: StateStore + ?Sized>(
    store: &mut S,
    player: &str,
    position: Position,
) -> Option<SlotType> {
    if player.is_empty() {
        return None;
    }

    let roster = load_roster(store);
    let mut assignments = load_assignments(store);

    for slot in position.eligible_slots() {
        if assignments.get(*slot).map_or(0, Vec::len) < roster.capacity(slot) {
            assignments.entry(slot.to_string()).or_default().push(player.to_string());
            save_assignments(store, &assignments);
            tracing::debug!(player, %position, slot, "player assigned");
            return Some(slot.to_string());
        }
    }

    tracing::debug!(player, %position, "no open slot for player");
    None
}

/// Removes `player` from every slot. Writes only when something changed.
pub fn unassign_player<S: StateStore + ?Sized>(store: &mut S, player: &str) -> bool {
    let mut assignments = load_assignments(store);
    let mut changed = false;

    for occupants in assignments.values_mut() {
        let before = occupants.len();
        occupants.retain(|p| p != player);
        if occupants.len() != before {
            changed = true;
        }
    }

    if changed {
        save_assignments(store, &assignments);
        tracing::debug!(player, "player unassigned");
    }
    changed
}
