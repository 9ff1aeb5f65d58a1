//! Cache error types.

use thiserror::Error;

/// Errors that can occur in the cache system.
///
/// None of these abort a run: read failures are misses, write failures are
/// logged by the caller.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to read a cache entry.
    #[error("Failed to read cache: {0}")]
    ReadError(String),

    /// Failed to write a cache entry.
    #[error("Failed to write cache: {0}")]
    WriteError(String),

    /// A cache entry could not be decoded.
    #[error("Corrupted cache: {0}")]
    Corrupted(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CacheError {
    /// Creates a read error.
    pub fn read(message: impl Into<String>) -> Self {
        Self::ReadError(message.into())
    }

    /// Creates a write error.
    pub fn write(message: impl Into<String>) -> Self {
        Self::WriteError(message.into())
    }

    /// Creates a corrupted cache error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted(message.into())
    }
}
