//! Storage layer for todohub
//!
//! State lives under three string keys, each holding a string value:
//!
//! ```text
//! tasks          JSON array of {id, text, completed}   absent => []
//! taskIdCounter  stringified integer                   absent => 0
//! statusFilter   all | inprogress | completed          absent => all
//! ```
//!
//! [`FileStore`] keeps those keys in a single JSON object on disk;
//! [`MemoryStore`] keeps them in memory. Both apply a batch of changes
//! all-or-nothing, which is what lets every task operation leave the
//! store either fully updated or untouched.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::task::{Task, TaskFilter};

pub const TASKS_KEY: &str = "tasks";
pub const COUNTER_KEY: &str = "taskIdCounter";
pub const FILTER_KEY: &str = "statusFilter";

/// A single key change inside a batch: `None` removes the key.
pub type Change = (&'static str, Option<String>);

/// String key-value persistence
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Apply every change or none of them.
    fn commit(&mut self, changes: &[Change]) -> Result<()>;
}

fn apply(map: &mut BTreeMap<String, String>, changes: &[Change]) {
    for (key, value) in changes {
        match value {
            Some(value) => {
                map.insert((*key).to_string(), value.clone());
            }
            None => {
                map.remove(*key);
            }
        }
    }
}

/// In-memory store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing validation.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.entries.insert(key.to_string(), value.into());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn commit(&mut self, changes: &[Change]) -> Result<()> {
        apply(&mut self.entries, changes);
        Ok(())
    }
}

/// JSON-object file store
///
/// The file is re-read on every access so that changes made by another
/// process are picked up on the next render.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    lock_timeout_ms: u64,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(Error::Io(err)),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|err| Error::CorruptStore {
            key: self.path.display().to_string(),
            reason: err.to_string(),
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_map()?.remove(key))
    }

    fn commit(&mut self, changes: &[Change]) -> Result<()> {
        let _lock = FileLock::acquire(lock::lock_path_for(&self.path), self.lock_timeout_ms)?;
        let mut map = match self.read_map() {
            // A batch of pure removals rewrites an unreadable file from scratch.
            Err(Error::CorruptStore { reason, .. })
                if changes.iter().all(|(_, value)| value.is_none()) =>
            {
                tracing::warn!(path = %self.path.display(), %reason, "discarding unreadable store");
                BTreeMap::new()
            }
            other => other?,
        };
        apply(&mut map, changes);
        let data = serde_json::to_vec_pretty(&map)?;
        lock::write_atomic(&self.path, &data)?;
        tracing::debug!(path = %self.path.display(), keys = changes.len(), "store committed");
        Ok(())
    }
}

/// Working copy of everything the store holds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    pub counter: u64,
    pub filter: TaskFilter,
}

impl Snapshot {
    /// Read all three keys.
    ///
    /// An unparseable `tasks` value is an error; a bad counter or filter
    /// falls back to its default.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Result<Self> {
        let tasks = load_tasks(store)?;
        let counter = store
            .get(COUNTER_KEY)?
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(0);
        let filter = load_filter(store)?;
        Ok(Self {
            tasks,
            counter,
            filter,
        })
    }

    pub fn find(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn find_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    pub fn tasks_change(&self) -> Result<Change> {
        Ok((TASKS_KEY, Some(serde_json::to_string(&self.tasks)?)))
    }

    pub fn counter_change(&self) -> Change {
        (COUNTER_KEY, Some(self.counter.to_string()))
    }

    pub fn filter_change(&self) -> Change {
        (FILTER_KEY, Some(self.filter.as_str().to_string()))
    }
}

pub fn load_tasks<S: KeyValueStore + ?Sized>(store: &S) -> Result<Vec<Task>> {
    match store.get(TASKS_KEY)? {
        None => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(&raw).map_err(|err| Error::CorruptStore {
            key: TASKS_KEY.to_string(),
            reason: err.to_string(),
        }),
    }
}

pub fn load_filter<S: KeyValueStore + ?Sized>(store: &S) -> Result<TaskFilter> {
    Ok(TaskFilter::parse_or_default(store.get(FILTER_KEY)?.as_deref()))
}
