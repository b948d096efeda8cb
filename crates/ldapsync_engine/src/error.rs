//! Error types for the sync engines.

use ldapsync_controls::{ControlError, ControlKind};
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Error returned by a user callback.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Result type returned by user callbacks.
pub type CallbackResult = Result<(), CallbackError>;

/// Errors that can occur during a sync session.
#[derive(Error, Debug)]
pub enum SyncError {
    /// An expected response control is absent.
    #[error("no {oid} control found")]
    ControlNotFound {
        /// OID that was looked up.
        oid: &'static str,
    },

    /// A control with the expected OID decoded to another variant.
    #[error("expected {expected} control, but got {actual}")]
    ControlTypeMismatch {
        /// Variant the engine needed.
        expected: ControlKind,
        /// Variant actually present.
        actual: ControlKind,
    },

    /// A control that must appear once appeared several times.
    #[error("expected one {oid} control, found {count}")]
    DuplicateControl {
        /// OID that was looked up.
        oid: &'static str,
        /// Number of matching controls.
        count: usize,
    },

    /// The server returned an empty DirSync cookie.
    #[error("dirsync cookie in the result is empty")]
    EmptyCookie,

    /// A control value could not be decoded.
    #[error("decode error: {0}")]
    Decode(ControlError),

    /// A user callback failed.
    #[error("callback returned an error: {0}")]
    Callback(#[source] CallbackError),

    /// The underlying search failed.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the operation can be retried.
        retryable: bool,
    },

    /// The session was cancelled.
    #[error("sync cancelled")]
    Cancelled,
}

impl SyncError {
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

    /// Wraps a callback error.
    pub fn callback(err: impl Into<CallbackError>) -> Self {
        Self::Callback(err.into())
    }

    /// Returns true if restarting the session from the last saved cookie
    /// may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::Transport { retryable: true, .. })
    }
}

impl From<ControlError> for SyncError {
    fn from(err: ControlError) -> Self {
        match err {
            ControlError::NotFound { oid } => SyncError::ControlNotFound { oid },
            ControlError::TypeMismatch { expected, actual } => {
                SyncError::ControlTypeMismatch { expected, actual }
            }
            other => SyncError::Decode(other),
        }
    }
}
