//! In-memory snapshot store for testing.

use crate::backend::SnapshotStore;
use crate::error::PersistResult;
use crate::snapshot::Snapshot;
use parking_lot::RwLock;

/// A snapshot store that keeps the snapshot in memory.
///
/// Suitable for unit tests, integration tests, and ephemeral sessions that
/// don't need durability across restarts.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    slot: RwLock<Option<Snapshot>>,
    saves: RwLock<u64>,
}

impl MemorySnapshotStore {
    /// Creates an empty store (`load` returns `None`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with a snapshot, as if a previous session
    /// had saved it.
    #[must_use]
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            slot: RwLock::new(Some(snapshot)),
            saves: RwLock::new(0),
        }
    }

    /// Returns a copy of the currently stored snapshot.
    #[must_use]
    pub fn stored(&self) -> Option<Snapshot> {
        self.slot.read().clone()
    }

    /// Number of times `save` has been called.
    #[must_use]
    pub fn save_count(&self) -> u64 {
        *self.saves.read()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> PersistResult<Option<Snapshot>> {
        Ok(self.slot.read().clone())
    }

    fn save(&self, snapshot: &Snapshot) -> PersistResult<()> {
        *self.slot.write() = Some(snapshot.clone());
        *self.saves.write() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_is_empty() {
        let store = MemorySnapshotStore::new();
        assert!(store.load().unwrap().is_none());
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn save_then_load() {
        let store = MemorySnapshotStore::new();
        store.save(&Snapshot::empty()).unwrap();

        assert_eq!(store.load().unwrap(), Some(Snapshot::empty()));
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn seeded_store_loads_snapshot() {
        let store = MemorySnapshotStore::with_snapshot(Snapshot::empty());
        assert!(store.load().unwrap().is_some());
    }
}
