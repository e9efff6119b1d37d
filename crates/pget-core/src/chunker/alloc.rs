//! Lock-free chunk allocation.

use std::sync::atomic::{AtomicU64, Ordering};

use super::range::Chunk;

/// Hands out chunks on demand to any number of workers.
///
/// A single atomic cursor is the only shared state: each claim is one
/// `fetch_add`, so no chunk is ever issued twice and no two workers can
/// receive overlapping ranges. Chunks are claimed, never returned; a worker
/// that dies takes its chunk with it.
pub struct ChunkAllocator {
    total_size: u64,
    chunk_size: u64,
    cursor: AtomicU64,
}

impl ChunkAllocator {
    /// `chunk_size` must be non-zero; the caller validates user input.
    pub fn new(total_size: u64, chunk_size: u64) -> Self {
        debug_assert!(chunk_size > 0, "chunk_size must be non-zero");
        ChunkAllocator {
            total_size,
            chunk_size,
            cursor: AtomicU64::new(0),
        }
    }

    /// Claims the next chunk, or `None` once the resource is fully covered.
    ///
    /// Exhaustion is sticky: every call after the first `None` also returns
    /// `None`, so workers can treat it as a plain termination signal. An
    /// index whose start offset no longer fits in `u64` counts as exhausted
    /// too, so over-claiming near the boundary cannot wrap around and
    /// re-issue a range.
    pub fn next_chunk(&self) -> Option<Chunk> {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        let chunk = Chunk::from_index(index, self.chunk_size)?;
        if chunk.start >= self.total_size {
            return None;
        }
        Some(chunk)
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Number of chunks the resource divides into.
    pub fn chunk_count(&self) -> u64 {
        self.total_size.div_ceil(self.chunk_size)
    }
}
