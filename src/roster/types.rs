use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

/// Roster slot type name, e.g. "QB", "FLEX", "BENCH"
pub type SlotType = String;

/// One row of the roster shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSlot {
    #[serde(rename = "type")]
    pub slot_type: SlotType,
    pub count: u32,
}

impl RosterSlot {
    pub fn new(slot_type: &str, count: u32) -> Self {
        RosterSlot {
            slot_type: slot_type.to_string(),
            count,
        }
    }
}

/// Ordered roster shape, one entry per slot type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RosterConfig {
    pub slots: Vec<RosterSlot>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        RosterConfig {
            slots: vec![
                RosterSlot::new("QB", 1),
                RosterSlot::new("RB", 2),
                RosterSlot::new("WR", 2),
                RosterSlot::new("TE", 2),
                RosterSlot::new("FLEX", 1),
                RosterSlot::new("SFLX", 0),
                RosterSlot::new("K", 1),
                RosterSlot::new("DST", 1),
                RosterSlot::new("BENCH", 7),
            ],
        }
    }
}

impl RosterConfig {
    pub fn new(slots: Vec<RosterSlot>) -> Self {
        RosterConfig { slots }
    }

    /// Configured capacity; 0 for slot types not in the roster
    pub fn capacity(&self, slot_type: &str) -> usize {
        self.slots
            .iter()
            .find(|s| s.slot_type == slot_type)
            .map(|s| s.count as usize)
            .unwrap_or(0)
    }

    /// Merges duplicate slot types, summing counts at the first occurrence
    pub fn merge_duplicates(self) -> Self {
        let mut merged: Vec<RosterSlot> = Vec::with_capacity(self.slots.len());
        for slot in self.slots {
            match merged.iter_mut().find(|m| m.slot_type == slot.slot_type) {
                Some(existing) => existing.count = existing.count.saturating_add(slot.count),
                None => merged.push(slot),
            }
        }
        RosterConfig::new(merged)
    }

    /// Adds one spot, appending a new slot type when absent
    pub fn add_slot(&mut self, slot_type: &str) {
        match self.slots.iter_mut().find(|s| s.slot_type == slot_type) {
            Some(slot) => slot.count = slot.count.saturating_add(1),
            None => self.slots.push(RosterSlot::new(slot_type, 1)),
        }
    }

    /// Removes one spot, dropping the slot type once it reaches zero.
    /// Returns false when the slot type is not configured.
    pub fn remove_slot(&mut self, slot_type: &str) -> bool {
        let Some(idx) = self.slots.iter().position(|s| s.slot_type == slot_type) else {
            return false;
        };
        let remaining = self.slots[idx].count.saturating_sub(1);
        if remaining == 0 {
            self.slots.remove(idx);
        } else {
            self.slots[idx].count = remaining;
        }
        true
    }
}

/// Slot type -> players occupying it, in insertion order
pub type Assignments = BTreeMap<SlotType, Vec<String>>;

/// Slot currently holding `player`, if any
pub fn slot_of<'a>(assignments: &'a Assignments, player: &str) -> Option<&'a str> {
    assignments
        .iter()
        .find(|(_, occupants)| occupants.iter().any(|p| p == player))
        .map(|(slot, _)| slot.as_str())
}

/// One row of the roster grid: `count` chips, filled ones first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterRow {
    #[serde(rename = "type")]
    pub slot_type: SlotType,
    pub count: u32,
    pub occupants: Vec<Option<String>>,
}

impl RosterRow {
    pub fn filled(&self) -> usize {
        self.occupants.iter().filter(|o| o.is_some()).count()
    }
}
