//! Core chunked downloader engine.
//!
//! Probes the resource with a HEAD request, splits it into fixed-size
//! chunks, and runs N worker threads that claim chunks from a shared
//! allocator and fetch them with HTTP Range GETs, writing each body to
//! the destination file at the chunk's offset. Completions are folded by
//! an aggregator thread into a running byte total.
//!
//! A worker that fails stops claiming work; its current chunk is not
//! retried or handed to another worker, so the run can finish with
//! unwritten ranges. The report says so; the remaining workers are not
//! interrupted.

mod error;
mod fetch;

pub use error::FetchError;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::mpsc::{Sender, SyncSender};
use std::sync::Arc;

use crate::chunker::ChunkAllocator;
use crate::config;
use crate::fetch_head;
use crate::progress::{completion_channel, Aggregator, Completion, ProgressEvent};
use crate::storage::StorageWriter;

/// Tuning knobs for a download run.
#[derive(Debug, Clone, Copy)]
pub struct DownloadOptions {
    /// Number of worker threads claiming chunks.
    pub workers: usize,
    /// Chunk size in bytes.
    pub chunk_size: u64,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        DownloadOptions {
            workers: config::DEFAULT_WORKERS,
            chunk_size: config::DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Summary of a finished run.
///
/// `bytes_reported` is the sum of completed chunk spans; it equals
/// `total_bytes` only if every chunk was fetched.
#[derive(Debug, Clone, Copy)]
pub struct DownloadReport {
    pub total_bytes: u64,
    pub bytes_reported: u64,
    pub chunks_completed: u64,
    pub workers_failed: usize,
}

/// Downloads `url` to `dest` with concurrent range requests.
///
/// Fails up front if the HEAD probe fails, the server reports no
/// `Content-Length`, or the destination cannot be opened. After that
/// point worker errors no longer abort the run; they are logged, counted
/// in the report, and may leave zero-filled gaps in the file.
///
/// If `events` is `Some`, one [`ProgressEvent::Chunk`] is sent per
/// completed chunk and a terminal [`ProgressEvent::Complete`] after the
/// last worker exits.
pub fn download(
    url: &str,
    dest: &Path,
    opts: DownloadOptions,
    events: Option<Sender<ProgressEvent>>,
) -> Result<DownloadReport> {
    anyhow::ensure!(opts.workers >= 1, "worker count must be at least 1");
    anyhow::ensure!(opts.chunk_size >= 1, "chunk size must be at least 1 byte");

    let head = fetch_head::probe(url).with_context(|| format!("HEAD probe failed for {url}"))?;
    let total_size = head
        .content_length
        .ok_or_else(|| anyhow::anyhow!("server did not report Content-Length for {url}"))?;
    if !head.accept_ranges {
        tracing::warn!(%url, "server does not advertise Accept-Ranges: bytes; proceeding anyway");
    }

    let storage = StorageWriter::open(dest)?;
    let allocator = Arc::new(ChunkAllocator::new(total_size, opts.chunk_size));
    tracing::info!(
        url,
        dest = %dest.display(),
        total_size,
        chunk_size = opts.chunk_size,
        chunks = allocator.chunk_count(),
        workers = opts.workers,
        "starting chunked download"
    );

    let (completion_tx, completion_rx) = completion_channel();
    let aggregator = Aggregator::spawn(completion_rx, total_size, events);

    let mut handles = Vec::with_capacity(opts.workers);
    for worker_id in 0..opts.workers {
        let allocator = Arc::clone(&allocator);
        let storage = storage.clone();
        let completions = completion_tx.clone();
        let url = url.to_string();
        handles.push(std::thread::spawn(move || {
            worker_loop(worker_id, &url, &allocator, &storage, &completions)
        }));
    }
    // Workers hold the only remaining senders; the conduit closes when the
    // last one exits, which is what wakes the aggregator's final event.
    drop(completion_tx);

    let mut workers_failed = 0;
    for handle in handles {
        let res = handle
            .join()
            .unwrap_or_else(|e| panic!("worker panicked: {:?}", e));
        if res.is_err() {
            // The worker already logged the details.
            workers_failed += 1;
        }
    }

    let totals = aggregator.join();
    storage.sync()?;

    if workers_failed > 0 {
        tracing::warn!(
            workers_failed,
            bytes_reported = totals.bytes_done,
            total_bytes = total_size,
            "download finished with unwritten ranges"
        );
    }

    Ok(DownloadReport {
        total_bytes: total_size,
        bytes_reported: totals.bytes_done,
        chunks_completed: totals.chunks_done,
        workers_failed,
    })
}

/// One worker: claim a chunk, fetch it, report the completion, repeat
/// until the allocator runs dry or a fetch fails.
fn worker_loop(
    worker_id: usize,
    url: &str,
    allocator: &ChunkAllocator,
    storage: &StorageWriter,
    completions: &SyncSender<Completion>,
) -> Result<(), FetchError> {
    while let Some(chunk) = allocator.next_chunk() {
        tracing::debug!(
            worker = worker_id,
            chunk = chunk.index,
            start = chunk.start,
            end = chunk.end,
            "fetching chunk"
        );
        if let Err(e) = fetch::fetch_one_chunk(url, &chunk, storage) {
            tracing::error!(
                worker = worker_id,
                chunk = chunk.index,
                "chunk fetch failed: {}",
                e
            );
            return Err(e);
        }
        // Credit the span the range request covers, not a measured count.
        let bytes = chunk.effective_len(allocator.total_size());
        if completions.send(Completion { bytes }).is_err() {
            break;
        }
    }
    tracing::debug!(worker = worker_id, "no chunks left, worker done");
    Ok(())
}
