//! Application state container and derived dirty tracking.

use crate::entity::{HealthRecord, Resident, UserProfile};
use crate::error::StoreResult;
use crate::record::{RecordId, SyncRecord, Timestamp};
use crate::store::RecordStore;

/// The application state: both record stores, the signed-in user, and the
/// sync cursor.
///
/// `AppState` is an explicitly constructed, passed-by-reference object; the
/// sync engine takes it as a dependency rather than reaching for a global.
/// Every mutating method recomputes the cached `has_unsynced_changes` flag,
/// so reads of the flag are always consistent and cheap.
#[derive(Debug, Default)]
pub struct AppState {
    residents: RecordStore<Resident>,
    health_records: RecordStore<HealthRecord>,
    user: Option<UserProfile>,
    last_sync: Option<Timestamp>,
    has_unsynced: bool,
}

impl AppState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds state from persisted parts; the dirty flag is recomputed
    /// from the data rather than trusted from the snapshot.
    #[must_use]
    pub fn from_parts(
        residents: Vec<SyncRecord<Resident>>,
        health_records: Vec<SyncRecord<HealthRecord>>,
        user: Option<UserProfile>,
        last_sync: Option<Timestamp>,
    ) -> Self {
        let mut state = Self {
            residents: RecordStore::from_records(residents),
            health_records: RecordStore::from_records(health_records),
            user,
            last_sync,
            has_unsynced: false,
        };
        state.recompute_unsynced();
        state
    }

    /// Read access to the resident store.
    #[must_use]
    pub fn residents(&self) -> &RecordStore<Resident> {
        &self.residents
    }

    /// Read access to the health-record store.
    #[must_use]
    pub fn health_records(&self) -> &RecordStore<HealthRecord> {
        &self.health_records
    }

    /// Mutable access to the resident store, for the sync engine.
    ///
    /// Callers must call [`AppState::recompute_unsynced`] after mutating.
    pub fn residents_mut(&mut self) -> &mut RecordStore<Resident> {
        &mut self.residents
    }

    /// Mutable access to the health-record store, for the sync engine.
    ///
    /// Callers must call [`AppState::recompute_unsynced`] after mutating.
    pub fn health_records_mut(&mut self) -> &mut RecordStore<HealthRecord> {
        &mut self.health_records
    }

    /// Creates a resident record.
    pub fn add_resident(&mut self, payload: Resident) -> RecordId {
        let id = self.residents.create(payload);
        self.recompute_unsynced();
        id
    }

    /// Edits a resident record.
    pub fn update_resident(
        &mut self,
        id: RecordId,
        edit: impl FnOnce(&mut Resident),
    ) -> StoreResult<()> {
        let result = self.residents.update(id, edit);
        self.recompute_unsynced();
        result
    }

    /// Soft-deletes a resident record.
    pub fn delete_resident(&mut self, id: RecordId) -> StoreResult<()> {
        let result = self.residents.soft_delete(id);
        self.recompute_unsynced();
        result
    }

    /// Creates a health record.
    pub fn add_health_record(&mut self, payload: HealthRecord) -> RecordId {
        let id = self.health_records.create(payload);
        self.recompute_unsynced();
        id
    }

    /// Edits a health record.
    pub fn update_health_record(
        &mut self,
        id: RecordId,
        edit: impl FnOnce(&mut HealthRecord),
    ) -> StoreResult<()> {
        let result = self.health_records.update(id, edit);
        self.recompute_unsynced();
        result
    }

    /// Soft-deletes a health record.
    pub fn delete_health_record(&mut self, id: RecordId) -> StoreResult<()> {
        let result = self.health_records.soft_delete(id);
        self.recompute_unsynced();
        result
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Sets or clears the signed-in user.
    pub fn set_user(&mut self, user: Option<UserProfile>) {
        self.user = user;
    }

    /// Cursor of the last successful sync cycle.
    #[must_use]
    pub fn last_sync(&self) -> Option<Timestamp> {
        self.last_sync
    }

    /// Commits a new sync cursor.
    pub fn set_last_sync(&mut self, cursor: Timestamp) {
        self.last_sync = Some(cursor);
    }

    /// Cached derived state: true iff any record of any kind is dirty.
    #[must_use]
    pub fn has_unsynced_changes(&self) -> bool {
        self.has_unsynced
    }

    /// Recomputes the cached dirty flag from both stores.
    ///
    /// Called by every mutating method here and by the engine after each
    /// sync phase; never computed lazily on read.
    pub fn recompute_unsynced(&mut self) {
        self.has_unsynced = self.residents.has_dirty() || self.health_records.has_dirty();
    }
}
