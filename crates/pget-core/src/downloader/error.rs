//! Chunk fetch error type.

use thiserror::Error;

/// Error returned by a single chunk fetch (curl failure, HTTP error, or
/// storage failure). A worker that hits one of these stops claiming chunks.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error(transparent)]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Disk/storage write failed (e.g. disk full, permission denied).
    #[error("storage: {0}")]
    Storage(#[source] std::io::Error),
}
