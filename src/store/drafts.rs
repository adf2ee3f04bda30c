use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use rand::distributions::Alphanumeric;
use rand::Rng;

use super::{FileStore, MemoryStore, StateStore};

const DRAFT_ID_LEN: usize = 32;

type DraftState = Box<dyn StateStore + Send>;

/// Server-side draft state, one store per browser, keyed by the id held in its session cookie.
///
/// With a directory each draft is a JSON file named after its id and survives restarts.
/// Without one drafts live in memory for the life of the process.
pub struct DraftRegistry {
    dir: Option<PathBuf>,
    drafts: Mutex<HashMap<String, DraftState>>,
}

impl DraftRegistry {
    pub fn in_memory() -> Self {
        DraftRegistry {
            dir: None,
            drafts: Mutex::new(HashMap::new()),
        }
    }

    pub fn persistent(dir: PathBuf) -> Self {
        if let Err(e) = fs::create_dir_all(&dir) {
            tracing::warn!(dir = %dir.display(), error = %e, "failed to create drafts directory");
        }
        DraftRegistry {
            dir: Some(dir),
            drafts: Mutex::new(HashMap::new()),
        }
    }

    /// Mints a fresh draft id
    pub fn new_id() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(DRAFT_ID_LEN)
            .map(char::from)
            .collect()
    }

    /// Ids double as file names, so only ones this registry could have minted are accepted
    pub fn is_valid_id(id: &str) -> bool {
        id.len() == DRAFT_ID_LEN && id.bytes().all(|b| b.is_ascii_alphanumeric())
    }

    /// Runs `f` against draft `id`, opening it on first use.
    ///
    /// The registry lock is held for the whole call, so requests touching drafts are serialized.
    pub fn with_draft<R>(&self, id: &str, f: impl FnOnce(&mut dyn StateStore) -> R) -> R {
        let mut drafts = self.drafts.lock().unwrap_or_else(PoisonError::into_inner);
        let draft = drafts.entry(id.to_string()).or_insert_with(|| self.open(id));
        f(&mut **draft)
    }

    fn open(&self, id: &str) -> DraftState {
        match &self.dir {
            Some(dir) => {
                tracing::debug!(draft = id, "opening draft file");
                Box::new(FileStore::open(dir.join(format!("{id}.json"))))
            }
            None => Box::new(MemoryStore::default()),
        }
    }
}
