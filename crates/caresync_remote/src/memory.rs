//! In-memory remote store for testing and local integration.

use crate::collection::{ChangeSet, RemoteCollection, RemoteStore};
use crate::error::{RemoteError, RemoteResult};
use caresync_store::{EntityPayload, HealthRecord, RecordId, Resident, SyncRecord, Timestamp};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// A strictly increasing server clock shared by all collections of one
/// remote, so stamps are totally ordered across collections.
#[derive(Debug)]
struct ServerClock {
    millis: AtomicU64,
}

impl ServerClock {
    fn new() -> Self {
        Self {
            millis: AtomicU64::new(Timestamp::now().as_millis()),
        }
    }

    /// Advances the clock and returns a stamp strictly greater than any
    /// stamp previously issued, even if the wall clock stalls.
    fn tick(&self) -> Timestamp {
        let wall = Timestamp::now().as_millis();
        let mut current = self.millis.load(Ordering::SeqCst);
        loop {
            let next = wall.max(current + 1);
            match self.millis.compare_exchange(
                current,
                next,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return Timestamp::from_millis(next),
                Err(observed) => current = observed,
            }
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

/// One in-memory remote collection.
///
/// Documents are keyed by record id; every write is stamped with the shared
/// server clock, overriding whatever `last_modified` the client submitted.
/// Fault injection hooks cover the error paths the engine must handle.
#[derive(Debug)]
pub struct MemoryCollection<P> {
    docs: RwLock<HashMap<RecordId, SyncRecord<P>>>,
    clock: Arc<ServerClock>,
    offline: Arc<AtomicBool>,
    upserts_until_failure: Mutex<Option<u32>>,
    fail_next_query: AtomicBool,
}

impl<P: EntityPayload> MemoryCollection<P> {
    fn new(clock: Arc<ServerClock>, offline: Arc<AtomicBool>) -> Self {
        Self {
            docs: RwLock::new(HashMap::new()),
            clock,
            offline,
            upserts_until_failure: Mutex::new(None),
            fail_next_query: AtomicBool::new(false),
        }
    }

    fn check_online(&self) -> RemoteResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(RemoteError::NotConnected)
        } else {
            Ok(())
        }
    }

    /// Seeds a document as if another device had pushed it: stamped by the
    /// server clock and stored clean. Tombstone flags are kept as given.
    pub fn seed(&self, record: SyncRecord<P>) -> SyncRecord<P> {
        let mut stored = record;
        stored.last_modified = self.clock.tick();
        stored.is_dirty = false;
        self.docs.write().insert(stored.id, stored.clone());
        stored
    }

    /// Inserts a document verbatim, without stamping.
    ///
    /// Test hook for scenarios that need controlled `last_modified` values.
    pub fn insert_raw(&self, record: SyncRecord<P>) {
        self.docs.write().insert(record.id, record);
    }

    /// Returns a stored document by id.
    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<SyncRecord<P>> {
        self.docs.read().get(&id).cloned()
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    /// True if the collection holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    /// Makes the upsert after the next `successes` calls fail once with a
    /// retryable transport error.
    pub fn fail_upsert_after(&self, successes: u32) {
        *self.upserts_until_failure.lock() = Some(successes);
    }

    /// Makes the next `changed_since` call fail once.
    pub fn fail_next_query(&self) {
        self.fail_next_query.store(true, Ordering::SeqCst);
    }

    fn take_upsert_failure(&self) -> bool {
        let mut slot = self.upserts_until_failure.lock();
        match *slot {
            Some(0) => {
                *slot = None;
                true
            }
            Some(n) => {
                *slot = Some(n - 1);
                false
            }
            None => false,
        }
    }
}

impl<P: EntityPayload + Send + Sync> RemoteCollection<P> for MemoryCollection<P> {
    fn upsert(&self, record: &SyncRecord<P>) -> RemoteResult<SyncRecord<P>> {
        self.check_online()?;
        if self.take_upsert_failure() {
            return Err(RemoteError::transport_retryable("injected upsert failure"));
        }

        let mut stored = record.clone();
        stored.last_modified = self.clock.tick();
        stored.is_dirty = false;
        self.docs.write().insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn delete(&self, id: RecordId) -> RemoteResult<()> {
        self.check_online()?;
        self.docs.write().remove(&id);
        Ok(())
    }

    fn changed_since(&self, since: Option<Timestamp>) -> RemoteResult<ChangeSet<P>> {
        self.check_online()?;
        if self.fail_next_query.swap(false, Ordering::SeqCst) {
            return Err(RemoteError::transport_retryable("injected query failure"));
        }

        let cursor = self.clock.now();
        let records = self
            .docs
            .read()
            .values()
            .filter(|doc| since.map_or(true, |t| doc.last_modified > t))
            .cloned()
            .collect();

        Ok(ChangeSet { records, cursor })
    }
}

/// An in-memory remote store: both collections over one shared server clock.
#[derive(Debug)]
pub struct MemoryRemote {
    clock: Arc<ServerClock>,
    offline: Arc<AtomicBool>,
    residents: MemoryCollection<Resident>,
    health_records: MemoryCollection<HealthRecord>,
}

impl MemoryRemote {
    /// Creates an empty remote store.
    #[must_use]
    pub fn new() -> Self {
        let clock = Arc::new(ServerClock::new());
        let offline = Arc::new(AtomicBool::new(false));
        Self {
            residents: MemoryCollection::new(Arc::clone(&clock), Arc::clone(&offline)),
            health_records: MemoryCollection::new(Arc::clone(&clock), Arc::clone(&offline)),
            clock,
            offline,
        }
    }

    /// Simulates losing or regaining connectivity for the whole store.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// The remote's current clock reading.
    #[must_use]
    pub fn server_time(&self) -> Timestamp {
        self.clock.now()
    }
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteStore for MemoryRemote {
    type Residents = MemoryCollection<Resident>;
    type HealthRecords = MemoryCollection<HealthRecord>;

    fn residents(&self) -> &Self::Residents {
        &self.residents
    }

    fn health_records(&self) -> &Self::HealthRecords {
        &self.health_records
    }
}
