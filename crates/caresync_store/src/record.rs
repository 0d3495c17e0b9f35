//! The syncable record model.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// A point in time, in milliseconds since the Unix epoch.
///
/// Timestamps drive last-writer-wins conflict resolution: every local
/// mutation stamps the local clock, every remote write is stamped by the
/// remote's clock, and the newer stamp wins on merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Creates a timestamp from raw milliseconds.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self(millis)
    }

    /// Returns the raw millisecond value.
    #[inline]
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Unique identifier for a record.
///
/// Record IDs are UUIDv4, generated on the client at creation time so that
/// records can be created with no connectivity. They are:
/// - Globally unique within a collection, locally and remotely
/// - Immutable once assigned
/// - The join key between the local and remote stores
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Creates a new random record ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a record ID from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RecordId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<RecordId> for Uuid {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

/// An entity kind that can be stored and synchronized.
///
/// The payload is opaque to the store and the sync engine; `KIND` names the
/// remote collection that holds records of this kind.
pub trait EntityPayload: Clone + Serialize + DeserializeOwned {
    /// Remote collection name for this entity kind.
    const KIND: &'static str;
}

/// A record tracked by the sync engine.
///
/// The record wraps an entity payload with the metadata the push–pull–merge
/// protocol needs: creation and modification stamps, the dirty flag, and the
/// tombstone flag.
///
/// # Lifecycle
///
/// Created dirty and live, mutated zero or more times (stays dirty,
/// `last_modified` refreshed), optionally tombstoned (stays dirty), cleaned
/// once its own push completes, and purged on the merge pass that follows a
/// successful cycle if tombstoned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncRecord<P> {
    /// Stable identifier, never reassigned.
    pub id: RecordId,
    /// Entity fields, opaque to the engine.
    pub payload: P,
    /// Set once at creation, immutable thereafter.
    pub created_at: Timestamp,
    /// Refreshed on every local mutation and overwritten by the server's
    /// clock on every remote write.
    pub last_modified: Timestamp,
    /// True iff this record has local changes not yet confirmed pushed.
    pub is_dirty: bool,
    /// Tombstone flag: logically absent, physically retained until a
    /// successful cycle confirms remote propagation.
    pub is_deleted: bool,
}

impl<P: EntityPayload> SyncRecord<P> {
    /// Creates a new record: fresh id, both stamps set to now, dirty, live.
    #[must_use]
    pub fn create(payload: P) -> Self {
        let now = Timestamp::now();
        Self {
            id: RecordId::new(),
            payload,
            created_at: now,
            last_modified: now,
            is_dirty: true,
            is_deleted: false,
        }
    }

    /// Marks a local mutation: refreshes `last_modified` and sets dirty.
    ///
    /// `last_modified` never moves backwards, even if the wall clock does.
    pub fn touch(&mut self, now: Timestamp) {
        self.last_modified = self.last_modified.max(now);
        self.is_dirty = true;
    }

    /// Tombstones the record.
    pub fn tombstone(&mut self, now: Timestamp) {
        self.is_deleted = true;
        self.touch(now);
    }

    /// Clears the dirty flag once a push has been confirmed.
    pub fn mark_clean(&mut self) {
        self.is_dirty = false;
    }
}
