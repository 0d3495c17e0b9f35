//! The persisted snapshot blob.

use caresync_store::{AppState, HealthRecord, Resident, SyncRecord, Timestamp, UserProfile};
use serde::{Deserialize, Serialize};

/// Current snapshot schema version.
///
/// Version history:
/// - 1: initial schema, no `role` on the user descriptor
/// - 2: user role tracking; clean tombstones are no longer persisted
pub const SCHEMA_VERSION: u32 = 2;

/// The single keyed blob written to durable storage: both entity
/// collections, the user descriptor, and the last successful sync cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Schema version this snapshot was written with.
    pub schema_version: u32,
    /// All resident records, tombstones included.
    pub residents: Vec<SyncRecord<Resident>>,
    /// All health records, tombstones included.
    pub health_records: Vec<SyncRecord<HealthRecord>>,
    /// The signed-in user, if a session was active.
    pub user: Option<UserProfile>,
    /// Cursor of the last successful sync cycle.
    pub last_sync: Option<Timestamp>,
}

impl Snapshot {
    /// An empty snapshot at the current schema version.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            residents: Vec::new(),
            health_records: Vec::new(),
            user: None,
            last_sync: None,
        }
    }

    /// Captures the current application state.
    #[must_use]
    pub fn capture(state: &AppState) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            residents: state.residents().to_vec(),
            health_records: state.health_records().to_vec(),
            user: state.user().cloned(),
            last_sync: state.last_sync(),
        }
    }

    /// Rebuilds application state from this snapshot.
    #[must_use]
    pub fn into_state(self) -> AppState {
        AppState::from_parts(self.residents, self.health_records, self.user, self.last_sync)
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}
