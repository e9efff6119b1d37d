//! Completion accounting and progress reporting.
//!
//! Workers send one [`Completion`] per finished chunk into a bounded
//! conduit; a single aggregator thread folds them into a running byte total
//! and optionally forwards [`ProgressEvent`]s to the CLI. The conduit is a
//! `sync_channel` with capacity 1: workers block briefly if the aggregator
//! falls behind, which bounds memory no matter how many workers run.

use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::thread;

/// Bound on in-flight completion notifications.
pub const COMPLETION_CHANNEL_CAPACITY: usize = 1;

/// One finished chunk, reported by the worker that downloaded it.
///
/// `bytes` is the chunk's effective span from range math, not a measured
/// count of what the server sent. A short body that ends without a transfer
/// error is still credited in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub bytes: u64,
}

/// Creates the bounded conduit workers report completions through.
pub fn completion_channel() -> (SyncSender<Completion>, Receiver<Completion>) {
    mpsc::sync_channel(COMPLETION_CHANNEL_CAPACITY)
}

/// Progress update emitted by the aggregator (CLI-friendly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A chunk finished; `bytes_done` is the running total so far.
    Chunk { bytes_done: u64, total_bytes: u64 },
    /// All workers are done and the conduit has closed.
    Complete { bytes_done: u64, total_bytes: u64 },
}

impl ProgressEvent {
    /// Fraction complete in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        let (done, total) = match *self {
            ProgressEvent::Chunk {
                bytes_done,
                total_bytes,
            }
            | ProgressEvent::Complete {
                bytes_done,
                total_bytes,
            } => (bytes_done, total_bytes),
        };
        if total == 0 {
            return 1.0;
        }
        (done as f64 / total as f64).min(1.0)
    }
}

/// Final tallies folded from the completion conduit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateTotals {
    /// Sum of all reported chunk spans.
    pub bytes_done: u64,
    /// Number of completion notifications received.
    pub chunks_done: u64,
}

/// Handle to the aggregator thread.
pub struct Aggregator {
    handle: thread::JoinHandle<AggregateTotals>,
}

impl Aggregator {
    /// Spawns the aggregation loop. It drains `completions` until every
    /// sender is dropped, then emits a terminal `Complete` event and
    /// returns the totals through [`Aggregator::join`].
    ///
    /// The terminal event fires on conduit closure alone; whether the
    /// running total actually reached `total_bytes` is not checked here.
    pub fn spawn(
        completions: Receiver<Completion>,
        total_bytes: u64,
        events: Option<Sender<ProgressEvent>>,
    ) -> Self {
        let handle = thread::spawn(move || {
            let mut totals = AggregateTotals::default();
            while let Ok(done) = completions.recv() {
                totals.bytes_done += done.bytes;
                totals.chunks_done += 1;
                if let Some(ref tx) = events {
                    let _ = tx.send(ProgressEvent::Chunk {
                        bytes_done: totals.bytes_done,
                        total_bytes,
                    });
                }
            }
            tracing::debug!(
                bytes_done = totals.bytes_done,
                chunks_done = totals.chunks_done,
                "completion conduit closed"
            );
            if let Some(ref tx) = events {
                let _ = tx.send(ProgressEvent::Complete {
                    bytes_done: totals.bytes_done,
                    total_bytes,
                });
            }
            totals
        });
        Aggregator { handle }
    }

    /// Waits for the aggregation loop to finish and returns the totals.
    pub fn join(self) -> AggregateTotals {
        self.handle
            .join()
            .unwrap_or_else(|e| panic!("aggregator panicked: {:?}", e))
    }
}
