use crate::store::{read_json, write_json, StateStore};
use super::reconcile::reconcile_store;
use super::types::RosterConfig;

pub const ROSTER_KEY: &str = "rosterSlots";

/// Loads the persisted roster shape, falling back to the default when absent or malformed
pub fn load_roster<S: StateStore + ?Sized>(store: &S) -> RosterConfig {
    match read_json::<S, RosterConfig>(store, ROSTER_KEY) {
        Some(roster) => roster.merge_duplicates(),
        None => RosterConfig::default(),
    }
}

pub fn save_roster<S: StateStore + ?Sized>(store: &mut S, roster: &RosterConfig) {
    write_json(store, ROSTER_KEY, roster);
}

/// Adds one spot of `slot_type` and reconciles.
/// Returns players ejected by the reconciliation pass.
pub fn add_roster_slot<S: StateStore + ?Sized>(store: &mut S, slot_type: &str) -> Vec<String> {
    let mut roster = load_roster(store);
    roster.add_slot(slot_type);
    save_roster(store, &roster);
    tracing::debug!(slot_type, capacity = roster.capacity(slot_type), "roster slot added");
    reconcile_store(store)
}

/// Removes one spot of `slot_type` and reconciles.
/// Returns players ejected by the reconciliation pass.
pub fn remove_roster_slot<S: StateStore + ?Sized>(store: &mut S, slot_type: &str) -> Vec<String> {
    let mut roster = load_roster(store);
    if roster.remove_slot(slot_type) {
        save_roster(store, &roster);
        tracing::debug!(slot_type, capacity = roster.capacity(slot_type), "roster slot removed");
    }
    reconcile_store(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::types::RosterSlot;
    use crate::store::MemoryStore;

    #[test]
    fn first_load_is_default() {
        let store = MemoryStore::default();
        assert_eq!(load_roster(&store), RosterConfig::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut store = MemoryStore::default();
        let roster = RosterConfig::new(vec![
            RosterSlot::new("QB", 2),
            RosterSlot::new("SFLX", 1),
            RosterSlot::new("BENCH", 5),
        ]);
        save_roster(&mut store, &roster);
        assert_eq!(load_roster(&store), roster);
    }

    #[test]
    fn persisted_layout_uses_type_and_count() {
        let mut store = MemoryStore::default();
        save_roster(&mut store, &RosterConfig::new(vec![RosterSlot::new("K", 1)]));
        assert_eq!(store.get(ROSTER_KEY).as_deref(), Some(r#"[{"type":"K","count":1}]"#));
    }

    #[test]
    fn malformed_roster_falls_back_to_default() {
        let cases = [
            "not json",
            r#"{"type":"QB","count":1}"#,
            r#"[{"type":"QB","count":-1}]"#,
            r#"[{"type":"QB"}]"#,
            r#"[{"count":3}]"#,
        ];
        for raw in cases {
            let mut store = MemoryStore::default();
            store.set(ROSTER_KEY, raw);
            assert_eq!(load_roster(&store), RosterConfig::default(), "input {}", raw);
        }
    }

    #[test]
    fn add_slot_increments_or_appends() {
        let mut store = MemoryStore::default();
        add_roster_slot(&mut store, "RB");
        add_roster_slot(&mut store, "IDP");
        let roster = load_roster(&store);
        assert_eq!(roster.capacity("RB"), 3);
        assert_eq!(roster.slots.last(), Some(&RosterSlot::new("IDP", 1)));
    }

    #[test]
    fn remove_missing_slot_is_a_no_op() {
        let mut store = MemoryStore::default();
        let removed = remove_roster_slot(&mut store, "IDP");
        assert!(removed.is_empty());
        assert_eq!(load_roster(&store), RosterConfig::default());
    }
}
