//! Error types for the record store.

use crate::record::RecordId;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No live record with the given id exists.
    ///
    /// Tombstoned records also report `NotFound`: they are logically absent
    /// from any presented view and cannot be edited or re-deleted.
    #[error("record not found: {id}")]
    NotFound {
        /// The id that was looked up.
        id: RecordId,
    },
}

impl StoreError {
    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(id: RecordId) -> Self {
        Self::NotFound { id }
    }
}
