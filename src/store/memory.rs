use std::collections::BTreeMap;

use super::StateStore;

/// In-memory store; also the working image behind `FileStore`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn from_map(values: BTreeMap<String, String>) -> Self {
        MemoryStore { values }
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn delete(&mut self, key: &str) {
        self.values.remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}
