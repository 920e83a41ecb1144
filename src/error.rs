//! Error types for blastio

use thiserror::Error;

/// Result type alias for blastio operations
pub type Result<T> = std::result::Result<T, BlastError>;

/// Error types that can occur in blastio
#[derive(Debug, Error)]
pub enum BlastError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A field that must be an integer could not be parsed.
    ///
    /// Numeric fields are never silently defaulted: a length or coordinate
    /// token that fails to parse would corrupt downstream analysis.
    #[error("Invalid field '{field}' at line {line}: {reason}")]
    InvalidField {
        /// Field name (e.g. "query_len", "Hsp_identity")
        field: String,
        /// Line number where the error occurred (1-based)
        line: usize,
        /// Reason the token was rejected
        reason: String,
    },

    /// A stored e-value token failed arbitrary-precision conversion
    #[error("Invalid e-value '{value}': {reason}")]
    InvalidEvalue {
        /// The verbatim token as it appeared in the input
        value: String,
        /// Reason the token was rejected
        reason: String,
    },
}
