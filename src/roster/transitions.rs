use crate::error::DraftError;
use crate::status::{flagged_players, set_my_team, set_taken};
use crate::store::StateStore;
use super::assignment::{load_assignments, save_assignments, try_assign_player, unassign_player};
use super::config::save_roster;
use super::eligibility::Position;
use super::reconcile::reconcile_store;
use super::types::{slot_of, Assignments, RosterConfig, SlotType};

/// Moves a player onto or off my team.
///
/// Joining clears the taken flag; leaving frees the player's roster slot.
pub fn set_my_team_state<S: StateStore + ?Sized>(store: &mut S, player: &str, on: bool) {
    if on {
        set_my_team(store, player, true);
        set_taken(store, player, false);
    } else {
        set_my_team(store, player, false);
        unassign_player(store, player);
    }
}

/// Marks a player as drafted elsewhere, or clears that mark.
///
/// Marking drops the player from my team and frees their slot; clearing touches nothing else.
pub fn set_taken_state<S: StateStore + ?Sized>(store: &mut S, player: &str, on: bool) {
    if on {
        set_taken(store, player, true);
        set_my_team(store, player, false);
        unassign_player(store, player);
    } else {
        set_taken(store, player, false);
    }
}

/// Drafts `player` onto my team, placing them by `position`.
///
/// A player already holding a slot keeps it. When no eligible slot is open the
/// player's status is left as it was.
pub fn draft_to_my_team<S: StateStore + ?Sized>(
    store: &mut S,
    player: &str,
    position: Position,
) -> Result<SlotType, DraftError> {
    if player.is_empty() {
        return Err(DraftError::EmptyPlayerName);
    }

    let existing = slot_of(&load_assignments(store), player).map(str::to_string);
    let slot = match existing {
        Some(slot) => slot,
        None => try_assign_player(store, player, position).ok_or_else(|| DraftError::RosterFull {
            player: player.to_string(),
            position,
        })?,
    };

    set_my_team_state(store, player, true);
    tracing::info!(player, %position, slot = %slot, "drafted to my team");
    Ok(slot)
}

/// Clears every flag on a player and frees their slot
pub fn release_player<S: StateStore + ?Sized>(store: &mut S, player: &str) {
    set_my_team(store, player, false);
    set_taken(store, player, false);
    unassign_player(store, player);
    tracing::info!(player, "player released");
}

/// Clears all picks and assignments but keeps the roster shape
pub fn clear_selections<S: StateStore + ?Sized>(store: &mut S) {
    let players = flagged_players(store);
    for player in &players {
        set_my_team(store, player, false);
        set_taken(store, player, false);
    }
    save_assignments(store, &Assignments::new());
    reconcile_store(store);
    tracing::info!(count = players.len(), "selections cleared");
}

/// Clears all picks and assignments and restores the default roster
pub fn reset_all<S: StateStore + ?Sized>(store: &mut S) {
    let players = flagged_players(store);
    for player in &players {
        set_my_team(store, player, false);
        set_taken(store, player, false);
    }
    save_roster(store, &RosterConfig::default());
    save_assignments(store, &Assignments::new());
    reconcile_store(store);
    tracing::info!(count = players.len(), "draft board reset");
}
