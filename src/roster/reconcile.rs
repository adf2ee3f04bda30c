use crate::status::set_my_team;
use crate::store::StateStore;
use super::assignment::{load_assignments, save_assignments};
use super::config::load_roster;
use super::types::{slot_of, Assignments, RosterConfig, RosterRow};

/// Trims every slot's occupants down to its capacity.
///
/// Slot types missing from `roster` have capacity 0. Returns the ejected players
/// in slot order, then insertion order.
pub fn reconcile(roster: &RosterConfig, assignments: &mut Assignments) -> Vec<String> {
    let mut removed = Vec::new();
    for (slot, occupants) in assignments.iter_mut() {
        let capacity = roster.capacity(slot);
        if occupants.len() > capacity {
            removed.extend(occupants.drain(capacity..));
        }
    }
    removed
}

/// Reconciles the persisted assignments against the persisted roster.
///
/// Ejected players lose their my-team flag and fall back to unassigned, unless a
/// duplicate entry still holds them in another slot.
pub fn reconcile_store<S: StateStore + ?Sized>(store: &mut S) -> Vec<String> {
    let roster = load_roster(store);
    let mut assignments = load_assignments(store);
    let removed = reconcile(&roster, &mut assignments);
    save_assignments(store, &assignments);

    for player in &removed {
        if slot_of(&assignments, player).is_none() {
            set_my_team(store, player, false);
        }
    }
    if !removed.is_empty() {
        tracing::info!(count = removed.len(), players = ?removed, "roster shrank, players released");
    }
    removed
}

/// Reconciled roster grid for rendering
pub fn roster_view<S: StateStore + ?Sized>(store: &mut S) -> Vec<RosterRow> {
    reconcile_store(store);
    let roster = load_roster(store);
    let assignments = load_assignments(store);

    roster
        .slots
        .iter()
        .map(|slot| {
            let filled = assignments.get(&slot.slot_type).map(Vec::as_slice).unwrap_or(&[]);
            let occupants = (0..slot.count as usize)
                .map(|i| filled.get(i).cloned())
                .collect();
            RosterRow {
                slot_type: slot.slot_type.clone(),
                count: slot.count,
                occupants,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::assignment::try_assign_player;
    use crate::roster::config::{add_roster_slot, remove_roster_slot, save_roster};
    use crate::roster::eligibility::Position;
    use crate::roster::types::RosterSlot;
    use crate::status::{is_in_my_team, set_my_team};
    use crate::store::MemoryStore;

    #[test]
    fn truncates_to_capacity_and_reports_excess() {
        let roster = RosterConfig::new(vec![RosterSlot::new("WR", 1), RosterSlot::new("BENCH", 2)]);
        let mut assignments = Assignments::new();
        assignments.insert("WR".into(), vec!["A".into(), "B".into(), "C".into()]);
        assignments.insert("BENCH".into(), vec!["D".into()]);
        assignments.insert("QB".into(), vec!["E".into()]);

        let removed = reconcile(&roster, &mut assignments);

        assert_eq!(removed, vec!["E", "B", "C"]);
        for (slot, occupants) in &assignments {
            assert!(occupants.len() <= roster.capacity(slot));
        }
        assert_eq!(assignments["WR"], vec!["A"]);
        assert_eq!(assignments["BENCH"], vec!["D"]);
    }

    #[test]
    fn removing_the_quarterback_slot_releases_its_occupant() {
        let mut store = MemoryStore::default();
        assert!(try_assign_player(&mut store, "Player X", Position::QB).is_some());
        set_my_team(&mut store, "Player X", true);

        assert!(remove_roster_slot(&mut store, "QB").contains(&"Player X".to_string()));
        // slot type is gone; a second removal is a no-op
        assert!(remove_roster_slot(&mut store, "QB").is_empty());

        assert!(!is_in_my_team(&store, "Player X"));
        assert!(load_assignments(&store)["QB"].is_empty());
        assert!(load_roster(&store).slots.iter().all(|s| s.slot_type != "QB"));
    }

    #[test]
    fn adding_capacity_never_ejects() {
        let mut store = MemoryStore::default();
        try_assign_player(&mut store, "Travis Kelce", Position::TE);
        set_my_team(&mut store, "Travis Kelce", true);

        assert!(add_roster_slot(&mut store, "TE").is_empty());
        assert!(is_in_my_team(&store, "Travis Kelce"));
    }

    #[test]
    fn view_pads_rows_with_empty_chips() {
        let mut store = MemoryStore::default();
        save_roster(&mut store, &RosterConfig::new(vec![RosterSlot::new("RB", 2)]));
        try_assign_player(&mut store, "Derrick Henry", Position::RB);

        let view = roster_view(&mut store);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].occupants, vec![Some("Derrick Henry".to_string()), None]);
        assert_eq!(view[0].filled(), 1);
    }

    #[test]
    fn view_reconciles_external_edits() {
        let mut store = MemoryStore::default();
        store.set("assignments", r#"{"K":["Kicker A","Kicker B"]}"#);
        set_my_team(&mut store, "Kicker A", true);
        set_my_team(&mut store, "Kicker B", true);

        let view = roster_view(&mut store);
        let kickers = view.iter().find(|r| r.slot_type == "K").unwrap();
        assert_eq!(kickers.occupants, vec![Some("Kicker A".to_string())]);
        assert!(is_in_my_team(&store, "Kicker A"));
        assert!(!is_in_my_team(&store, "Kicker B"));
    }

    #[test]
    fn duplicate_still_seated_elsewhere_keeps_its_flag() {
        let mut store = MemoryStore::default();
        store.set("assignments", r#"{"BENCH":["Justin Tucker"],"K":["Brandon Aubrey","Justin Tucker"]}"#);
        set_my_team(&mut store, "Justin Tucker", true);

        assert_eq!(reconcile_store(&mut store), vec!["Justin Tucker"]);
        assert!(is_in_my_team(&store, "Justin Tucker"));
        assert_eq!(load_assignments(&store)["BENCH"], vec!["Justin Tucker"]);
    }
}
