//! # Entity State Registry
//!
//! Player id -> [`TravelerRecord`]. The map is guarded by a `RwLock` so
//! join/leave callbacks and the tick thread can touch it concurrently.
//! Each record sits behind its own `Mutex`; in practice only the owning
//! player's callbacks lock it, so that lock is uncontended.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::record::TravelerRecord;

/// Shared handle to one player's record.
pub type RecordHandle = Arc<Mutex<TravelerRecord>>;

/// Concurrency-safe map of live records.
#[derive(Debug, Default)]
pub struct EntityStateRegistry {
    records: RwLock<HashMap<String, RecordHandle>>,
}

impl EntityStateRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for `player_id`, if active.
    #[must_use]
    pub fn get(&self, player_id: &str) -> Option<RecordHandle> {
        self.records.read().get(player_id).cloned()
    }

    /// Installs `record` as the live record for `player_id`, replacing any
    /// previous one.
    pub fn associate(&self, player_id: &str, record: TravelerRecord) -> RecordHandle {
        let handle = Arc::new(Mutex::new(record));
        self.records
            .write()
            .insert(player_id.to_string(), Arc::clone(&handle));
        handle
    }

    /// Record for `player_id`, creating an empty one on first use.
    pub fn get_or_create(&self, player_id: &str) -> RecordHandle {
        if let Some(handle) = self.get(player_id) {
            return handle;
        }
        let mut records = self.records.write();
        Arc::clone(
            records
                .entry(player_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(TravelerRecord::new()))),
        )
    }

    /// Removes and returns the record for `player_id`.
    pub fn remove(&self, player_id: &str) -> Option<RecordHandle> {
        self.records.write().remove(player_id)
    }

    /// Number of active records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// True if no records are active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Ids and handles of every active record, taken under one read lock.
    ///
    /// The tick iterates the snapshot so it never holds the map lock while
    /// calling into the host.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(String, RecordHandle)> {
        let mut entries: Vec<_> = self
            .records
            .read()
            .iter()
            .map(|(id, handle)| (id.clone(), Arc::clone(handle)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Drops every record (server stop).
    pub fn clear(&self) {
        self.records.write().clear();
    }
}
