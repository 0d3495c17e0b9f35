//! Error types for snapshot persistence.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for persistence operations.
pub type PersistResult<T> = Result<T, PersistError>;

/// Errors that can occur while loading or saving snapshots.
#[derive(Debug, Error)]
pub enum PersistError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Snapshot could not be encoded or decoded.
    #[error("snapshot codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Another process holds the snapshot lock.
    #[error("snapshot locked: another process has exclusive access to {path}")]
    Locked {
        /// The locked snapshot path.
        path: PathBuf,
    },

    /// The stored snapshot was written by a newer schema than this build
    /// understands.
    #[error("unsupported snapshot version: found {found}, supported up to {supported}")]
    UnsupportedVersion {
        /// Version found in the snapshot.
        found: u32,
        /// Newest version this build supports.
        supported: u32,
    },

    /// The snapshot structure is not what the schema expects.
    #[error("invalid snapshot: {message}")]
    InvalidSnapshot {
        /// Description of the problem.
        message: String,
    },

    /// A migration step failed.
    #[error("migration to version {target} failed: {message}")]
    MigrationFailed {
        /// The version the failing step migrates to.
        target: u32,
        /// Description of the failure.
        message: String,
    },
}

impl PersistError {
    /// Creates an invalid-snapshot error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidSnapshot {
            message: message.into(),
        }
    }

    /// Creates a migration-failed error.
    pub fn migration_failed(target: u32, message: impl Into<String>) -> Self {
        Self::MigrationFailed {
            target,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PersistError::UnsupportedVersion {
            found: 9,
            supported: 2,
        };
        assert!(err.to_string().contains('9'));
        assert!(err.to_string().contains('2'));

        let err = PersistError::invalid("missing residents array");
        assert!(err.to_string().contains("missing residents array"));
    }
}
