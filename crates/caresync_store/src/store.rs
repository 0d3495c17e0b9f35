//! Per-kind record store with soft deletes and dirty tracking.

use crate::error::{StoreError, StoreResult};
use crate::record::{EntityPayload, RecordId, SyncRecord, Timestamp};
use std::collections::HashMap;

/// An in-memory collection of records of one entity kind.
///
/// The store keeps every physical record, including tombstones; the presented
/// view (`get`, `live`) hides tombstones. Records are addressable by their
/// stable [`RecordId`].
///
/// All mutation goes through `&mut self`: the store assumes a single writer
/// at a time.
#[derive(Debug, Clone)]
pub struct RecordStore<P> {
    records: HashMap<RecordId, SyncRecord<P>>,
}

impl<P> Default for RecordStore<P> {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
        }
    }
}

impl<P: EntityPayload> RecordStore<P> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    /// Builds a store from existing records, e.g. a loaded snapshot.
    #[must_use]
    pub fn from_records(records: Vec<SyncRecord<P>>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.id, r)).collect(),
        }
    }

    /// Creates a new record from a payload and returns its generated id.
    ///
    /// The record starts dirty and live, with both stamps set to now.
    pub fn create(&mut self, payload: P) -> RecordId {
        let record = SyncRecord::create(payload);
        let id = record.id;
        self.records.insert(id, record);
        id
    }

    /// Applies an edit to the payload of a live record.
    ///
    /// Refreshes `last_modified` and marks the record dirty. Unknown or
    /// tombstoned ids signal [`StoreError::NotFound`] to the caller.
    pub fn update(&mut self, id: RecordId, edit: impl FnOnce(&mut P)) -> StoreResult<()> {
        match self.records.get_mut(&id) {
            Some(record) if !record.is_deleted => {
                edit(&mut record.payload);
                record.touch(Timestamp::now());
                Ok(())
            }
            _ => Err(StoreError::not_found(id)),
        }
    }

    /// Tombstones a live record.
    ///
    /// The record disappears from presented views immediately but is retained
    /// physically until a sync cycle confirms the deletion reached the remote
    /// store. Unknown or already-tombstoned ids signal [`StoreError::NotFound`].
    pub fn soft_delete(&mut self, id: RecordId) -> StoreResult<()> {
        match self.records.get_mut(&id) {
            Some(record) if !record.is_deleted => {
                record.tombstone(Timestamp::now());
                Ok(())
            }
            _ => Err(StoreError::not_found(id)),
        }
    }

    /// Replaces the entire contents with the given records.
    ///
    /// Used only by the sync engine to install merge results.
    pub fn replace_all(&mut self, records: Vec<SyncRecord<P>>) {
        self.records = records.into_iter().map(|r| (r.id, r)).collect();
    }

    /// Returns a live record by id. Tombstones are hidden.
    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&SyncRecord<P>> {
        self.records.get(&id).filter(|r| !r.is_deleted)
    }

    /// Iterates over every physical record, tombstones included.
    pub fn records(&self) -> impl Iterator<Item = &SyncRecord<P>> {
        self.records.values()
    }

    /// Iterates over the presented view: live records only.
    pub fn live(&self) -> impl Iterator<Item = &SyncRecord<P>> {
        self.records.values().filter(|r| !r.is_deleted)
    }

    /// Returns a cloned snapshot of all dirty records.
    ///
    /// The sync engine pushes from this snapshot rather than holding the
    /// store borrowed across remote calls.
    #[must_use]
    pub fn dirty_records(&self) -> Vec<SyncRecord<P>> {
        self.records.values().filter(|r| r.is_dirty).cloned().collect()
    }

    /// Returns true if any record is dirty.
    #[must_use]
    pub fn has_dirty(&self) -> bool {
        self.records.values().any(|r| r.is_dirty)
    }

    /// Clears the dirty flag of one record, but only if its `last_modified`
    /// still equals the value the pusher saw.
    ///
    /// A mutation committed while the record's push was in flight bumps
    /// `last_modified`, the compare fails, and the record stays dirty for the
    /// next cycle. Returns whether the flag was cleared.
    pub fn clear_dirty_if_unchanged(&mut self, id: RecordId, seen: Timestamp) -> bool {
        match self.records.get_mut(&id) {
            Some(record) if record.last_modified == seen => {
                record.mark_clean();
                true
            }
            _ => false,
        }
    }

    /// Returns a cloned copy of every physical record.
    #[must_use]
    pub fn to_vec(&self) -> Vec<SyncRecord<P>> {
        self.records.values().cloned().collect()
    }

    /// Number of physical records, tombstones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the store holds no physical records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
