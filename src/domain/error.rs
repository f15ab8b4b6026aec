//! Error types for shoplist.
//!
//! The engine itself never fails: unknown ids degrade to no-ops. Errors only
//! arise at the edges, in storage, the sync worker, configuration loading, and
//! decoding records that arrive from the document store.

use thiserror::Error;

/// The main error type for shoplist operations.
#[derive(Debug, Error)]
pub enum ShoplistError {
    /// Storage operation failed.
    ///
    /// Occurs when reading from or writing to the document store fails, or
    /// when a targeted patch names a document that does not exist.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Communication with the sync worker failed.
    ///
    /// Raised when the worker thread is gone and a message cannot be posted
    /// or a response cannot be received.
    #[error("Sync error: {0}")]
    Sync(String),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A record from the document store is malformed.
    ///
    /// The whole record is rejected; nothing from it is applied.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// A specialized `Result` type for shoplist operations.
pub type Result<T> = std::result::Result<T, ShoplistError>;
