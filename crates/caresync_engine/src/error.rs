//! Error types for the sync engine.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No authenticated user at cycle start; no remote calls were made.
    #[error("not authenticated: sync requires a signed-in user")]
    NotAuthenticated,

    /// A cycle is already in flight; the request was rejected, not queued.
    #[error("a sync cycle is already in progress")]
    SyncInProgress,

    /// The remote store adapter failed.
    #[error("remote error: {0}")]
    Remote(#[from] caresync_remote::RemoteError),

    /// Snapshot persistence failed.
    #[error("persistence error: {0}")]
    Persist(#[from] caresync_persist::PersistError),

    /// A local store operation failed.
    #[error("store error: {0}")]
    Store(#[from] caresync_store::StoreError),
}

impl SyncError {
    /// Returns true if a fresh cycle may succeed without intervention.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Remote(e) => e.is_retryable(),
            _ => false,
        }
    }
}
