use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::Category;

pub const DEFAULT_STORAGE_KEY: &str = "adzunaIds";

/// Synchronous string key-value persistence used for the identifier sets.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage key '{0}' is not a plain file name")]
    InvalidKey(String),
    #[error("storage io failure for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not serialize identifier sets: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// The persisted saved/applied/archived identifier sets.
///
/// Sets are kept pairwise disjoint; [`IdentifierSets::moved`] removes an
/// identifier everywhere before adding it to its new home.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierSets {
    #[serde(default)]
    pub saved: BTreeSet<String>,
    #[serde(default)]
    pub applied: BTreeSet<String>,
    #[serde(default)]
    pub archived: BTreeSet<String>,
}

impl IdentifierSets {
    /// Parses a persisted record. Absent fields become empty sets; a record that
    /// does not parse at all yields `None`.
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str::<Self>(raw)
            .ok()
            .map(Self::into_disjoint)
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn set(&self, category: Category) -> Option<&BTreeSet<String>> {
        match category {
            Category::New => None,
            Category::Saved => Some(&self.saved),
            Category::Applied => Some(&self.applied),
            Category::Archived => Some(&self.archived),
        }
    }

    fn set_mut(&mut self, category: Category) -> Option<&mut BTreeSet<String>> {
        match category {
            Category::New => None,
            Category::Saved => Some(&mut self.saved),
            Category::Applied => Some(&mut self.applied),
            Category::Archived => Some(&mut self.archived),
        }
    }

    /// Category the identifier is classified under; `New` when it is in no set.
    pub fn category_of(&self, id: &str) -> Category {
        Category::classified()
            .into_iter()
            .find(|category| self.set(*category).is_some_and(|set| set.contains(id)))
            .unwrap_or(Category::New)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.category_of(id) != Category::New
    }

    /// Total number of stored identifiers across the three sets.
    pub fn len(&self) -> usize {
        self.saved.len() + self.applied.len() + self.archived.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn all_ids(&self) -> HashSet<&str> {
        self.saved
            .iter()
            .chain(&self.applied)
            .chain(&self.archived)
            .map(String::as_str)
            .collect()
    }

    /// Copy of these sets with `id` removed everywhere and then, unless `target`
    /// is `New`, added to the target set.
    pub fn moved(&self, target: Category, id: &str) -> Self {
        let mut next = self.clone();
        for category in Category::classified() {
            if let Some(set) = next.set_mut(category) {
                set.remove(id);
            }
        }
        if let Some(set) = next.set_mut(target) {
            set.insert(id.to_string());
        }
        next
    }

    /// Copy of these sets keeping only identifiers contained in `live`.
    pub fn retained(&self, live: &HashSet<&str>) -> Self {
        let keep = |set: &BTreeSet<String>| {
            set.iter()
                .filter(|id| live.contains(id.as_str()))
                .cloned()
                .collect::<BTreeSet<_>>()
        };

        Self {
            saved: keep(&self.saved),
            applied: keep(&self.applied),
            archived: keep(&self.archived),
        }
    }

    pub fn is_disjoint(&self) -> bool {
        self.all_ids().len() == self.len()
    }

    fn into_disjoint(self) -> Self {
        if self.is_disjoint() {
            return self;
        }

        warn!("persisted identifier sets overlap; keeping the first classification");
        let Self {
            saved,
            mut applied,
            mut archived,
        } = self;
        applied.retain(|id| !saved.contains(id));
        archived.retain(|id| !saved.contains(id) && !applied.contains(id));
        Self {
            saved,
            applied,
            archived,
        }
    }
}

/// Loads and saves [`IdentifierSets`] under one fixed key of a [`KeyValueStore`].
pub struct IdentifierStore<S> {
    backend: Arc<S>,
    key: String,
}

impl<S> IdentifierStore<S>
where
    S: KeyValueStore,
{
    pub fn new(backend: Arc<S>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &Arc<S> {
        &self.backend
    }

    /// Reads the persisted record. Missing, unreadable or malformed records
    /// yield empty sets.
    pub fn load(&self) -> IdentifierSets {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "no persisted identifier sets");
                return IdentifierSets::default();
            }
            Err(err) => {
                warn!(key = %self.key, %err, "could not read identifier sets; starting empty");
                return IdentifierSets::default();
            }
        };

        IdentifierSets::from_json(&raw).unwrap_or_else(|| {
            warn!(key = %self.key, "malformed identifier sets; starting empty");
            IdentifierSets::default()
        })
    }

    pub fn save(&self, sets: &IdentifierSets) -> Result<(), StoreError> {
        let payload = sets.to_json()?;
        self.backend.set(&self.key, &payload)
    }
}

/// Process-local store; contents are lost when the process exits.
#[derive(Debug, Default, Clone)]
pub struct MemoryKeyValueStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKeyValueStore {
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::default();
        store.lock().insert(key.to_string(), value.to_string());
        store
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Stores each key as `<root>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let plain = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\']);
        if !plain {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let io_error = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };

        fs::create_dir_all(&self.root).map_err(io_error)?;
        // Write-then-rename so a crash never leaves a truncated record behind.
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value).map_err(io_error)?;
        fs::rename(&staging, &path).map_err(io_error)
    }
}
