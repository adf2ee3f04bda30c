pub mod memory;
pub mod file;
pub mod drafts;

pub use memory::MemoryStore;
pub use file::FileStore;
pub use drafts::DraftRegistry;

/// Flat key-value map holding every piece of draft state.
///
/// Backends never surface I/O failures: a value that cannot be read is simply absent,
/// and a write that cannot be persisted is logged and dropped.
pub trait StateStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn delete(&mut self, key: &str);
    fn keys(&self) -> Vec<String>;
}

/// A named family of per-player values stored as `<prefix>:<player>` keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collection {
    prefix: &'static str,
}

impl Collection {
    pub const fn new(prefix: &'static str) -> Self {
        Collection { prefix }
    }

    fn key(&self, player: &str) -> String {
        format!("{}:{}", self.prefix, player)
    }

    pub fn get<S: StateStore + ?Sized>(&self, store: &S, player: &str) -> Option<String> {
        store.get(&self.key(player))
    }

    pub fn contains<S: StateStore + ?Sized>(&self, store: &S, player: &str) -> bool {
        self.get(store, player).is_some()
    }

    pub fn set<S: StateStore + ?Sized>(&self, store: &mut S, player: &str, value: &str) {
        store.set(&self.key(player), value);
    }

    pub fn delete<S: StateStore + ?Sized>(&self, store: &mut S, player: &str) {
        store.delete(&self.key(player));
    }

    /// Player names with an entry in this collection, in store key order
    pub fn names<S: StateStore + ?Sized>(&self, store: &S) -> Vec<String> {
        let marker = format!("{}:", self.prefix);
        store
            .keys()
            .into_iter()
            .filter_map(|k| k.strip_prefix(&marker).map(str::to_string))
            .collect()
    }

    /// Every `(player, value)` pair in this collection
    pub fn entries<S: StateStore + ?Sized>(&self, store: &S) -> Vec<(String, String)> {
        self.names(store)
            .into_iter()
            .filter_map(|name| self.get(store, &name).map(|v| (name, v)))
            .collect()
    }
}

/// Reads a JSON value, treating a missing or malformed entry as absent
pub fn read_json<S, T>(store: &S, key: &str) -> Option<T>
where
    S: StateStore + ?Sized,
    T: serde::de::DeserializeOwned,
{
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring malformed persisted value");
            None
        }
    }
}

pub fn write_json<S, T>(store: &mut S, key: &str, value: &T)
where
    S: StateStore + ?Sized,
    T: serde::Serialize,
{
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key, &raw),
        Err(e) => tracing::warn!(key, error = %e, "failed to encode state value"),
    }
}
