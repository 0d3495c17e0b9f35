//! Remote collection and remote store traits.

use crate::error::RemoteResult;
use caresync_store::{EntityPayload, HealthRecord, RecordId, Resident, SyncRecord, Timestamp};

/// The changes a collection returns for a pull.
#[derive(Debug, Clone)]
pub struct ChangeSet<P> {
    /// Records with `last_modified` strictly after the requested cursor.
    pub records: Vec<SyncRecord<P>>,
    /// The remote's clock at query time.
    ///
    /// The engine commits this value, not the local clock, as the next
    /// sync baseline, so clock skew between devices cannot open or close
    /// the pull window incorrectly.
    pub cursor: Timestamp,
}

/// One remote entity collection.
///
/// Implementations assign the authoritative `last_modified` (their own
/// clock) on every write; the value a client submitted is overridden and
/// the stored form is returned. Both writes are idempotent by construction:
/// upsert-by-id and delete-by-id can be reissued after a failure without
/// harm, which is what makes a fresh sync cycle a safe retry.
pub trait RemoteCollection<P: EntityPayload>: Send + Sync {
    /// Creates or overwrites the record keyed by its id, returning the
    /// stored form with the server-assigned `last_modified`.
    fn upsert(&self, record: &SyncRecord<P>) -> RemoteResult<SyncRecord<P>>;

    /// Deletes the record with the given id. Deleting an absent id succeeds.
    fn delete(&self, id: RecordId) -> RemoteResult<()>;

    /// Returns records modified strictly after `since`, or every record
    /// when `since` is `None` (first sync).
    fn changed_since(&self, since: Option<Timestamp>) -> RemoteResult<ChangeSet<P>>;
}

/// The authenticated remote store handle: one collection per entity kind.
pub trait RemoteStore: Send + Sync {
    /// Collection type for residents.
    type Residents: RemoteCollection<Resident>;
    /// Collection type for health records.
    type HealthRecords: RemoteCollection<HealthRecord>;

    /// The resident collection.
    fn residents(&self) -> &Self::Residents;

    /// The health-record collection.
    fn health_records(&self) -> &Self::HealthRecords;
}
