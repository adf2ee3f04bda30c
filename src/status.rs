use chrono::Utc;
use serde::Serialize;

use crate::store::{Collection, StateStore};

pub const MY_TEAM: Collection = Collection::new("myteam");
pub const TAKEN: Collection = Collection::new("taken");
/// Older boards stored team membership under this name
pub const LEGACY_DRAFTED: Collection = Collection::new("draftedAny");

const FLAG_ON: &str = "1";

/// Where a player stands in the draft. Exactly one state is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "takenAt", rename_all = "camelCase")]
pub enum PlayerStatus {
    Unassigned,
    OnTeam,
    /// Drafted by another team, with the time it was marked (unix millis)
    Taken(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TakenPlayer {
    pub name: String,
    pub taken_at: i64,
}

pub fn is_in_my_team<S: StateStore + ?Sized>(store: &S, player: &str) -> bool {
    if player.is_empty() {
        return false;
    }
    MY_TEAM.get(store, player).as_deref() == Some(FLAG_ON)
        || LEGACY_DRAFTED.get(store, player).as_deref() == Some(FLAG_ON)
}

pub fn is_taken<S: StateStore + ?Sized>(store: &S, player: &str) -> bool {
    !player.is_empty() && TAKEN.contains(store, player)
}

/// Raw my-team setter. Clearing (or setting) always drops the legacy flag.
pub fn set_my_team<S: StateStore + ?Sized>(store: &mut S, player: &str, on: bool) {
    if player.is_empty() {
        return;
    }
    if on {
        MY_TEAM.set(store, player, FLAG_ON);
    } else {
        MY_TEAM.delete(store, player);
    }
    LEGACY_DRAFTED.delete(store, player);
}

/// Raw taken setter, stamping the current time when marking
pub fn set_taken<S: StateStore + ?Sized>(store: &mut S, player: &str, on: bool) {
    if on {
        mark_taken_at(store, player, Utc::now().timestamp_millis());
    } else if !player.is_empty() {
        TAKEN.delete(store, player);
    }
}

pub fn mark_taken_at<S: StateStore + ?Sized>(store: &mut S, player: &str, at_millis: i64) {
    if player.is_empty() {
        return;
    }
    TAKEN.set(store, player, &at_millis.to_string());
}

pub fn status<S: StateStore + ?Sized>(store: &S, player: &str) -> PlayerStatus {
    if player.is_empty() {
        return PlayerStatus::Unassigned;
    }
    if let Some(raw) = TAKEN.get(store, player) {
        return PlayerStatus::Taken(parse_timestamp(&raw));
    }
    if is_in_my_team(store, player) {
        PlayerStatus::OnTeam
    } else {
        PlayerStatus::Unassigned
    }
}

/// Hidden from the available-player list
pub fn is_off_board<S: StateStore + ?Sized>(store: &S, player: &str) -> bool {
    status(store, player) != PlayerStatus::Unassigned
}

/// My-team names including legacy entries, sorted case-insensitively
pub fn my_team_names<S: StateStore + ?Sized>(store: &S) -> Vec<String> {
    let mut names: Vec<String> = MY_TEAM.names(store);
    names.extend(LEGACY_DRAFTED.names(store));
    names.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
    names.dedup();
    names
}

/// Taken players, most recently marked first
pub fn taken_players<S: StateStore + ?Sized>(store: &S) -> Vec<TakenPlayer> {
    let mut taken: Vec<TakenPlayer> = TAKEN
        .entries(store)
        .into_iter()
        .map(|(name, raw)| TakenPlayer {
            name,
            taken_at: parse_timestamp(&raw),
        })
        .collect();
    taken.sort_by(|a, b| b.taken_at.cmp(&a.taken_at));
    taken
}

/// Every player carrying any status flag
pub fn flagged_players<S: StateStore + ?Sized>(store: &S) -> Vec<String> {
    let mut names = my_team_names(store);
    names.extend(TAKEN.names(store));
    names.sort();
    names.dedup();
    names
}

fn parse_timestamp(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(0)
}
