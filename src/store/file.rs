use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{MemoryStore, StateStore};

/// Store persisted as a single JSON object on disk, rewritten after every mutation.
///
/// Used by the command-line mode so picks survive between invocations.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    /// Opens the state file. A missing or unreadable file starts an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                Ok(values) => values,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "state file is malformed, starting fresh");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read state file");
                BTreeMap::new()
            }
        };

        FileStore {
            path,
            inner: MemoryStore::from_map(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) {
        let encoded = match serde_json::to_string_pretty(self.inner.as_map()) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode state file");
                return;
            }
        };
        if let Err(e) = fs::write(&self.path, encoded) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write state file");
        }
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) {
        self.inner.set(key, value);
        self.flush();
    }

    fn delete(&mut self, key: &str) {
        if self.inner.get(key).is_some() {
            self.inner.delete(key);
            self.flush();
        }
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }
}
