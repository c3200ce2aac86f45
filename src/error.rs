//! Error types for ChainDB
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using ChainError
pub type Result<T> = std::result::Result<T, ChainError>;

/// Unified error type for ChainDB operations
#[derive(Debug, Error)]
pub enum ChainError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Open / Create Errors
    // -------------------------------------------------------------------------
    /// Zero-valued hash table, key or value size supplied at creation time
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Bad magic/version, a zero size field, or a truncated header/directory/chain
    #[error("Corrupt database file: {0}")]
    CorruptFile(String),

    // -------------------------------------------------------------------------
    // Operation Errors
    // -------------------------------------------------------------------------
    #[error("Key not found")]
    KeyNotFound,

    #[error("Key size mismatch: expected {expected} bytes, got {actual}")]
    KeySize { expected: u32, actual: usize },

    #[error("Value size mismatch: expected {expected} bytes, got {actual}")]
    ValueSize { expected: u32, actual: usize },

    #[error("Database was opened read-only")]
    ReadOnly,

    /// The record region outgrew what a 32-bit relative offset can address
    #[error("Record region is full: offset {0} is not addressable")]
    RegionFull(u64),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ChainError {
    /// Map an unexpected end-of-file into `CorruptFile`, keep every other error
    ///
    /// Used where a short read can only mean a damaged file (a link pointing past
    /// the end, a truncated directory), rather than a storage-layer failure.
    pub(crate) fn eof_as_corrupt(err: std::io::Error, what: impl FnOnce() -> String) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            ChainError::CorruptFile(what())
        } else {
            ChainError::Io(err)
        }
    }
}
