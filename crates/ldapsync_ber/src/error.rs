//! Error types for the BER crate.

use thiserror::Error;

/// Result type for BER operations.
pub type BerResult<T> = Result<T, BerError>;

/// Errors that can occur while decoding BER packets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BerError {
    /// Unexpected end of input.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// Indefinite-length items are not allowed in LDAP.
    #[error("indefinite-length items are forbidden")]
    IndefiniteLength,

    /// The length field does not fit in 64 bits.
    #[error("length field overflows")]
    LengthOverflow,

    /// The high-tag-number form does not fit in 64 bits.
    #[error("tag number overflows")]
    TagOverflow,

    /// Bytes remained after the packet was decoded.
    #[error("{count} trailing bytes after packet")]
    TrailingBytes {
        /// Number of unconsumed bytes.
        count: usize,
    },

    /// Constructed packets nest deeper than allowed.
    #[error("packet nesting exceeds {max} levels")]
    NestingTooDeep {
        /// Maximum allowed depth.
        max: usize,
    },

    /// Invalid packet structure.
    #[error("invalid BER structure: {message}")]
    InvalidStructure {
        /// Description of the structural error.
        message: String,
    },
}

impl BerError {
    /// Create an invalid structure error.
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }
}
