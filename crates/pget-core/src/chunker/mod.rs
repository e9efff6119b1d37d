//! Chunk range math and on-demand allocation.
//!
//! Splits a resource into fixed-size chunks identified by a monotonically
//! increasing index and hands them out through an atomic cursor, so any
//! number of workers can claim work without locks or duplication.

mod alloc;
mod range;

pub use alloc::ChunkAllocator;
pub use range::Chunk;
