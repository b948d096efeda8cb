//! Error types for control encoding and decoding.

use crate::registry::ControlKind;
use ldapsync_ber::BerError;
use thiserror::Error;

/// Result type for control operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur while decoding or looking up controls.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    /// The control value is not valid BER.
    #[error("BER error: {0}")]
    Ber(#[from] BerError),

    /// The control or its value has the wrong shape.
    #[error("malformed {control} control: {message}")]
    Malformed {
        /// Name of the control being decoded.
        control: &'static str,
        /// Description of the problem.
        message: String,
    },

    /// A sync state value outside present/add/modify/delete.
    #[error("invalid entry state {0}")]
    InvalidEntryState(i64),

    /// An expected control is absent.
    #[error("no {oid} control found")]
    NotFound {
        /// OID that was looked up.
        oid: &'static str,
    },

    /// A control with the right OID holds a different variant.
    #[error("expected {expected} control, but got {actual}")]
    TypeMismatch {
        /// Variant the caller asked for.
        expected: ControlKind,
        /// Variant actually stored.
        actual: ControlKind,
    },
}

impl ControlError {
    /// Create a malformed control error.
    pub fn malformed(control: &'static str, message: impl Into<String>) -> Self {
        Self::Malformed {
            control,
            message: message.into(),
        }
    }
}
