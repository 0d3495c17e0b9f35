//! Error types for the remote store adapter.

use thiserror::Error;

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors that can occur talking to the remote store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// Network or transport error.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the operation can be retried.
        retryable: bool,
    },

    /// The remote rejected the caller's credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The remote reported an internal failure.
    #[error("remote store error: {0}")]
    Server(String),

    /// No connection to the remote store.
    #[error("not connected to remote store")]
    NotConnected,
}

impl RemoteError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if a fresh sync cycle may succeed without operator
    /// intervention.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Transport { retryable, .. } => *retryable,
            RemoteError::Server(_) => true,
            RemoteError::Unauthorized(_) | RemoteError::NotConnected => false,
        }
    }
}
