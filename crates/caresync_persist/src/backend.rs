//! Snapshot store trait definition.

use crate::error::PersistResult;
use crate::snapshot::Snapshot;

/// A durable store for the application snapshot.
///
/// Snapshot stores are **whole-blob** adapters: `load` restores the latest
/// snapshot at startup, `save` replaces it. Persistence is explicit: the
/// client calls `save` after every mutation batch and the engine calls it
/// after every sync cycle; there is no write-through middleware.
///
/// # Invariants
///
/// - `load` returns `None` only when no snapshot has ever been saved
/// - `save` is atomic: a crash mid-save must leave the previous snapshot
///   readable
/// - Implementations are `Send + Sync`; interior locking keeps concurrent
///   `save`/`load` calls consistent
///
/// # Implementors
///
/// - [`super::MemorySnapshotStore`] - for tests and ephemeral sessions
/// - [`super::FileSnapshotStore`] - JSON file with atomic replace
pub trait SnapshotStore: Send + Sync {
    /// Loads the latest snapshot, or `None` on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot exists but cannot be read, decoded,
    /// or migrated to the current schema version.
    fn load(&self) -> PersistResult<Option<Snapshot>>;

    /// Durably replaces the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be encoded or written.
    fn save(&self, snapshot: &Snapshot) -> PersistResult<()>;
}
