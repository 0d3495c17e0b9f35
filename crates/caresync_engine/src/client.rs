//! Client facade over store, persistence, and sync engine.

use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::state::{SyncEngine, SyncReport, SyncStats, SyncStatus};
use caresync_persist::{Snapshot, SnapshotStore};
use caresync_remote::RemoteStore;
use caresync_store::{
    AppState, HealthRecord, RecordId, Resident, SyncRecord, Timestamp, UserProfile,
};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// The mutation API the presentation layer talks to.
///
/// `SyncClient` owns the shared application state, saves a snapshot after
/// every mutation batch, and exposes the sync engine's entry points. The
/// presentation layer only ever (a) calls these mutators and (b) reads the
/// derived status fields; everything else is internal to the core.
pub struct SyncClient<R, S> {
    state: Arc<RwLock<AppState>>,
    persist: Arc<S>,
    engine: SyncEngine<R, S>,
}

impl<R: RemoteStore, S: SnapshotStore> SyncClient<R, S> {
    /// Opens a client: loads and migrates the persisted snapshot if one
    /// exists, otherwise starts empty.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing snapshot cannot be read or migrated.
    pub fn open(remote: R, persist: S, config: SyncConfig) -> SyncResult<Self> {
        let snapshot = persist.load()?;
        let restored = snapshot.is_some();
        let state = Arc::new(RwLock::new(
            snapshot.map(Snapshot::into_state).unwrap_or_default(),
        ));
        info!(restored, "client opened");

        let persist = Arc::new(persist);
        let engine = SyncEngine::new(
            Arc::clone(&state),
            Arc::new(remote),
            Arc::clone(&persist),
            config,
        );

        Ok(Self {
            state,
            persist,
            engine,
        })
    }

    /// Creates a resident record and saves a snapshot.
    pub fn add_resident(&self, payload: Resident) -> SyncResult<RecordId> {
        let id = self.state.write().add_resident(payload);
        self.save()?;
        Ok(id)
    }

    /// Edits a resident record and saves a snapshot.
    pub fn update_resident(
        &self,
        id: RecordId,
        edit: impl FnOnce(&mut Resident),
    ) -> SyncResult<()> {
        self.state.write().update_resident(id, edit)?;
        self.save()
    }

    /// Soft-deletes a resident record and saves a snapshot.
    pub fn delete_resident(&self, id: RecordId) -> SyncResult<()> {
        self.state.write().delete_resident(id)?;
        self.save()
    }

    /// Creates a health record and saves a snapshot.
    pub fn add_health_record(&self, payload: HealthRecord) -> SyncResult<RecordId> {
        let id = self.state.write().add_health_record(payload);
        self.save()?;
        Ok(id)
    }

    /// Edits a health record and saves a snapshot.
    pub fn update_health_record(
        &self,
        id: RecordId,
        edit: impl FnOnce(&mut HealthRecord),
    ) -> SyncResult<()> {
        self.state.write().update_health_record(id, edit)?;
        self.save()
    }

    /// Soft-deletes a health record and saves a snapshot.
    pub fn delete_health_record(&self, id: RecordId) -> SyncResult<()> {
        self.state.write().delete_health_record(id)?;
        self.save()
    }

    /// Installs the signed-in user and saves a snapshot.
    pub fn set_user(&self, user: UserProfile) -> SyncResult<()> {
        self.state.write().set_user(Some(user));
        self.save()
    }

    /// Clears the session and saves a snapshot. Local records stay on the
    /// device so field work can continue after a later sign-in.
    pub fn sign_out(&self) -> SyncResult<()> {
        self.state.write().set_user(None);
        self.save()
    }

    /// Live resident records (tombstones hidden).
    #[must_use]
    pub fn residents(&self) -> Vec<SyncRecord<Resident>> {
        self.state.read().residents().live().cloned().collect()
    }

    /// Live health records (tombstones hidden).
    #[must_use]
    pub fn health_records(&self) -> Vec<SyncRecord<HealthRecord>> {
        self.state.read().health_records().live().cloned().collect()
    }

    /// Runs a closure against the current state.
    pub fn with_state<T>(&self, f: impl FnOnce(&AppState) -> T) -> T {
        f(&self.state.read())
    }

    /// The shared state handle, for callers that integrate the engine into
    /// a larger session object.
    #[must_use]
    pub fn shared_state(&self) -> Arc<RwLock<AppState>> {
        Arc::clone(&self.state)
    }

    /// The remote store this client reconciles against.
    #[must_use]
    pub fn remote(&self) -> &Arc<R> {
        self.engine.remote()
    }

    /// True iff any record of any kind is dirty.
    #[must_use]
    pub fn has_unsynced_changes(&self) -> bool {
        self.state.read().has_unsynced_changes()
    }

    /// The engine's current status.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        self.engine.status()
    }

    /// Cumulative sync statistics.
    #[must_use]
    pub fn stats(&self) -> SyncStats {
        self.engine.stats()
    }

    /// Cursor of the last successful sync cycle.
    #[must_use]
    pub fn last_sync(&self) -> Option<Timestamp> {
        self.state.read().last_sync()
    }

    /// Runs one sync cycle.
    pub fn sync(&self) -> SyncResult<SyncReport> {
        self.engine.sync()
    }

    /// Runs sync cycles with the configured retry policy.
    pub fn sync_with_retry(&self) -> SyncResult<SyncReport> {
        self.engine.sync_with_retry()
    }

    fn save(&self) -> SyncResult<()> {
        let snapshot = {
            let state = self.state.read();
            Snapshot::capture(&state)
        };
        self.persist.save(&snapshot)?;
        Ok(())
    }
}
