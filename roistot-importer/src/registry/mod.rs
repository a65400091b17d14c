//! In-memory entity registries
//!
//! Every entity met while reading the table gets one registry entry with a
//! temporary id. Entries are append-only; lookups by key go through a hash
//! index. Durable ids are filled in by persistence.

mod records;

pub use records::{StoryDraft, StoryPublicationLink, StoryVillainLink};

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-local entity id, unique across all registries of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TempId(pub u64);

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared temporary id counter
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: AtomicU64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id, starting from 1
    pub fn allocate(&self) -> TempId {
        TempId(self.next.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Number of ids handed out so far
    pub fn allocated(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

/// Registry entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<T> {
    pub id: TempId,
    pub item: T,
    /// Id assigned by the store once persisted
    pub durable_id: Option<i64>,
}

/// Append-only collection with key and temp id lookup
#[derive(Debug)]
pub struct Registry<K, T> {
    entries: Vec<Entry<T>>,
    by_key: HashMap<K, usize>,
    by_id: HashMap<TempId, usize>,
}

impl<K, T> Default for Registry<K, T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            by_key: HashMap::new(),
            by_id: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, T> Registry<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_by_key(&self, key: &K) -> Option<&Entry<T>> {
        self.by_key.get(key).map(|&idx| &self.entries[idx])
    }

    pub fn find_by_key_mut(&mut self, key: &K) -> Option<&mut Entry<T>> {
        match self.by_key.get(key) {
            Some(&idx) => self.entries.get_mut(idx),
            None => None,
        }
    }

    /// Append a new entry under `key` with a fresh temporary id
    ///
    /// Callers look the key up first; adding an existing key re-points the
    /// key at the new entry.
    pub fn add(&mut self, ids: &IdAllocator, key: K, item: T) -> &mut Entry<T> {
        let id = ids.allocate();
        let idx = self.entries.len();
        self.entries.push(Entry {
            id,
            item,
            durable_id: None,
        });
        self.by_key.insert(key, idx);
        self.by_id.insert(id, idx);
        &mut self.entries[idx]
    }

    /// Existing entry for `key`, or a new one built by `make`
    ///
    /// The flag is true when the entry was created.
    pub fn find_or_add(
        &mut self,
        ids: &IdAllocator,
        key: K,
        make: impl FnOnce() -> T,
    ) -> (&mut Entry<T>, bool) {
        match self.by_key.get(&key) {
            Some(&idx) => (&mut self.entries[idx], false),
            None => (self.add(ids, key, make()), true),
        }
    }

    pub fn get(&self, id: TempId) -> Option<&Entry<T>> {
        self.by_id.get(&id).map(|&idx| &self.entries[idx])
    }

    pub fn get_mut(&mut self, id: TempId) -> Option<&mut Entry<T>> {
        match self.by_id.get(&id) {
            Some(&idx) => self.entries.get_mut(idx),
            None => None,
        }
    }

    /// Durable id of the entry with `id`, if persisted
    pub fn durable_id(&self, id: TempId) -> Option<i64> {
        self.get(id).and_then(|entry| entry.durable_id)
    }

    /// All entries in insertion order
    pub fn entries(&self) -> &[Entry<T>] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [Entry<T>] {
        &mut self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Append the values of `additions` missing from `target`, keeping order
pub fn merge_unique(target: &mut Vec<String>, additions: &[String]) {
    for value in additions {
        if !target.contains(value) {
            target.push(value.clone());
        }
    }
}
