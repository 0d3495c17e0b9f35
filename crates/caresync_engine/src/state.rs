//! Sync engine state machine and protocol.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::merge;
use caresync_persist::{Snapshot, SnapshotStore};
use caresync_remote::{ChangeSet, RemoteCollection, RemoteStore};
use caresync_store::{AppState, EntityPayload, RecordStore};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// The current state of the sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// No cycle has run yet, or the engine is between cycles.
    Idle,
    /// A cycle is in flight.
    Syncing,
    /// The last cycle completed successfully.
    Success,
    /// The last cycle failed.
    Error,
}

impl SyncStatus {
    /// Returns true if a new cycle may start.
    #[must_use]
    pub fn can_start(&self) -> bool {
        !matches!(self, SyncStatus::Syncing)
    }

    /// Returns true if a cycle is in flight.
    #[must_use]
    pub fn is_syncing(&self) -> bool {
        matches!(self, SyncStatus::Syncing)
    }
}

/// Cumulative statistics across sync cycles.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Completed cycles.
    pub cycles_completed: u64,
    /// Total records pushed.
    pub records_pushed: u64,
    /// Total records pulled.
    pub records_pulled: u64,
    /// Total tombstones purged on merge.
    pub tombstones_purged: u64,
    /// Retries performed by `sync_with_retry`.
    pub retries: u64,
    /// When the last successful cycle finished.
    pub last_sync_time: Option<Instant>,
    /// Message of the last failure, cleared on success.
    pub last_error: Option<String>,
}

/// The result of one successful sync cycle.
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Records pushed in phase 1.
    pub pushed: u64,
    /// Records pulled in phase 2.
    pub pulled: u64,
    /// Tombstones purged in phase 3.
    pub purged: u64,
    /// Wall-clock duration of the cycle.
    pub duration: Duration,
}

/// The sync orchestrator.
///
/// Consumes the shared [`AppState`], a [`RemoteStore`], and a
/// [`SnapshotStore`] to execute sync cycles. All dependencies are explicit;
/// the engine owns no global state.
pub struct SyncEngine<R, S> {
    state: Arc<RwLock<AppState>>,
    remote: Arc<R>,
    persist: Arc<S>,
    config: SyncConfig,
    status: RwLock<SyncStatus>,
    stats: RwLock<SyncStats>,
    in_flight: AtomicBool,
}

impl<R: RemoteStore, S: SnapshotStore> SyncEngine<R, S> {
    /// Creates a new engine over the given state, remote, and persistence.
    pub fn new(
        state: Arc<RwLock<AppState>>,
        remote: Arc<R>,
        persist: Arc<S>,
        config: SyncConfig,
    ) -> Self {
        Self {
            state,
            remote,
            persist,
            config,
            status: RwLock::new(SyncStatus::Idle),
            stats: RwLock::new(SyncStats::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// The engine's current status.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        *self.status.read()
    }

    /// A copy of the cumulative statistics.
    #[must_use]
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// The remote store this engine reconciles against.
    #[must_use]
    pub fn remote(&self) -> &Arc<R> {
        &self.remote
    }

    fn set_status(&self, status: SyncStatus) {
        *self.status.write() = status;
    }

    /// Runs one sync cycle: push → pull → merge → commit.
    ///
    /// Only one cycle may be in flight at a time; a call while another is
    /// running is rejected with [`SyncError::SyncInProgress`], not queued.
    ///
    /// # Errors
    ///
    /// Any failure aborts the remainder of the cycle, sets the status to
    /// [`SyncStatus::Error`], and leaves the sync cursor unchanged so the
    /// next cycle re-attempts from the same baseline. Records whose own
    /// push already succeeded keep their cleared dirty flag; the rest stay
    /// dirty.
    pub fn sync(&self) -> SyncResult<SyncReport> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SyncError::SyncInProgress);
        }

        let result = self.run_cycle();
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    /// Runs sync cycles until one succeeds or the attempts are exhausted.
    ///
    /// Only retryable failures are retried; retrying a full cycle is safe
    /// because every remote write is an idempotent upsert/delete by id.
    pub fn sync_with_retry(&self) -> SyncResult<SyncReport> {
        let retry = self.config.retry.clone();
        let attempts = retry.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                std::thread::sleep(retry.delay_for_attempt(attempt));
                self.stats.write().retries += 1;
            }

            match self.sync() {
                Ok(report) => return Ok(report),
                Err(e) if e.is_retryable() && attempt + 1 < attempts => {
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        // Unreachable with attempts >= 1; the last attempt returns above.
        Err(last_error.unwrap_or(SyncError::SyncInProgress))
    }

    fn run_cycle(&self) -> SyncResult<SyncReport> {
        let start = Instant::now();

        if self.state.read().user().is_none() {
            let err = SyncError::NotAuthenticated;
            self.fail(&err);
            return Err(err);
        }

        self.set_status(SyncStatus::Syncing);
        info!("sync cycle started");

        match self.run_phases() {
            Ok((pushed, pulled, purged)) => {
                self.set_status(SyncStatus::Success);
                {
                    let mut stats = self.stats.write();
                    stats.cycles_completed += 1;
                    stats.records_pushed += pushed;
                    stats.records_pulled += pulled;
                    stats.tombstones_purged += purged;
                    stats.last_sync_time = Some(Instant::now());
                    stats.last_error = None;
                }
                info!(pushed, pulled, purged, "sync cycle complete");

                Ok(SyncReport {
                    pushed,
                    pulled,
                    purged,
                    duration: start.elapsed(),
                })
            }
            Err(e) => {
                self.fail(&e);
                // Per-record dirty clears from a partial push are real state;
                // persist them so a restart does not re-push confirmed records.
                if let Err(save_err) = self.save_snapshot() {
                    warn!(error = %save_err, "could not persist state after failed cycle");
                }
                Err(e)
            }
        }
    }

    fn run_phases(&self) -> SyncResult<(u64, u64, u64)> {
        // Phase 1: push. Both kinds push before anything pulls, so the pull
        // observes the remote's post-push state.
        let mut pushed = self.push_kind(self.remote.residents(), AppState::residents_mut)?;
        pushed += self.push_kind(self.remote.health_records(), AppState::health_records_mut)?;

        // Phase 2: pull everything modified after the last committed cursor.
        let since = self.state.read().last_sync();
        let resident_changes = self.remote.residents().changed_since(since)?;
        let health_changes = self.remote.health_records().changed_since(since)?;

        let pulled = (resident_changes.records.len() + health_changes.records.len()) as u64;
        // The committed cursor is the older of the two response cursors, so
        // neither collection can skip a window on the next pull.
        let cursor = resident_changes.cursor.min(health_changes.cursor);

        // Phases 3 and 4: merge and commit under a single writer lock.
        let purged = {
            let mut state = self.state.write();
            let mut purged = install_merge(state.residents_mut(), resident_changes);
            purged += install_merge(state.health_records_mut(), health_changes);
            state.set_last_sync(cursor);
            state.recompute_unsynced();
            purged
        };

        self.save_snapshot()?;

        Ok((pushed, pulled, purged))
    }

    fn push_kind<P, C, F>(&self, collection: &C, store_of: F) -> SyncResult<u64>
    where
        P: EntityPayload,
        C: RemoteCollection<P>,
        F: Fn(&mut AppState) -> &mut RecordStore<P>,
    {
        // Push from a snapshot of the dirty set rather than holding the
        // state borrowed across remote calls.
        let dirty = {
            let mut state = self.state.write();
            store_of(&mut state).dirty_records()
        };

        let mut pushed = 0u64;
        for record in dirty {
            if record.is_deleted {
                collection.delete(record.id)?;
                debug!(kind = P::KIND, id = %record.id, "pushed delete");
            } else {
                collection.upsert(&record)?;
                debug!(kind = P::KIND, id = %record.id, "pushed upsert");
            }

            // The dirty flag clears per record, immediately after its own
            // push. The stamp compare keeps a record dirty if a mutation
            // landed while its push was in flight.
            let mut state = self.state.write();
            store_of(&mut state).clear_dirty_if_unchanged(record.id, record.last_modified);
            state.recompute_unsynced();
            pushed += 1;
        }

        Ok(pushed)
    }

    fn fail(&self, error: &SyncError) {
        self.set_status(SyncStatus::Error);
        self.stats.write().last_error = Some(error.to_string());
        warn!(error = %error, "sync cycle failed");
    }

    fn save_snapshot(&self) -> SyncResult<()> {
        let snapshot = {
            let state = self.state.read();
            Snapshot::capture(&state)
        };
        self.persist.save(&snapshot)?;
        Ok(())
    }
}

fn install_merge<P: EntityPayload>(store: &mut RecordStore<P>, changes: ChangeSet<P>) -> u64 {
    let outcome = merge::last_writer_wins(store.to_vec(), changes.records);
    store.replace_all(outcome.records);
    outcome.purged
}
