//! Chunk type and range math.

/// One fixed-size byte range of the resource: `[start, end]`, end inclusive.
///
/// Derived from a chunk index: `start = index * chunk_size`,
/// `end = start + chunk_size - 1`. The final chunk's `end` may point past
/// the last byte of the resource; range semantics let the server truncate
/// the response, so the overrun is kept rather than corrected here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// Zero-based index the range was derived from.
    pub index: u64,
    /// Start offset (inclusive).
    pub start: u64,
    /// End offset (inclusive); may overrun the resource.
    pub end: u64,
}

impl Chunk {
    /// `None` when the start offset would overflow `u64`; such an index is
    /// past the end of any resource.
    pub(crate) fn from_index(index: u64, chunk_size: u64) -> Option<Self> {
        let start = index.checked_mul(chunk_size)?;
        Some(Chunk {
            index,
            start,
            end: start.saturating_add(chunk_size - 1),
        })
    }

    /// Nominal length of the requested range, overrun included.
    pub fn requested_len(&self) -> u64 {
        (self.end - self.start).saturating_add(1)
    }

    /// Length of the part of the range that lies within a resource of
    /// `total_size` bytes: what a range-capable server actually returns.
    pub fn effective_len(&self, total_size: u64) -> u64 {
        if self.start >= total_size {
            return 0;
        }
        self.end.min(total_size - 1) - self.start + 1
    }

    /// HTTP Range header value: `bytes=start-end` (inclusive end).
    pub fn range_header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_are_contiguous_and_fixed_size() {
        let chunks: Vec<Chunk> = (0..3)
            .map(|i| Chunk::from_index(i, 10).unwrap())
            .collect();
        assert_eq!((chunks[0].start, chunks[0].end), (0, 9));
        assert_eq!((chunks[1].start, chunks[1].end), (10, 19));
        assert_eq!((chunks[2].start, chunks[2].end), (20, 29));
        for c in &chunks {
            assert_eq!(c.requested_len(), 10);
        }
    }

    #[test]
    fn final_chunk_overrun_is_kept_in_the_range() {
        // 25-byte resource in 10-byte chunks: the third range ends at 29.
        let last = Chunk::from_index(2, 10).unwrap();
        assert_eq!(last.start, 20);
        assert_eq!(last.end, 29);
        assert_eq!(last.requested_len(), 10);
        assert_eq!(last.effective_len(25), 5);
    }

    #[test]
    fn effective_len_matches_requested_len_inside_the_resource() {
        let c = Chunk::from_index(1, 10).unwrap();
        assert_eq!(c.effective_len(25), 10);
        assert_eq!(c.effective_len(20), 10);
    }

    #[test]
    fn effective_len_is_zero_past_the_resource() {
        let c = Chunk::from_index(3, 10).unwrap();
        assert_eq!(c.effective_len(25), 0);
    }

    #[test]
    fn range_header_value_is_inclusive() {
        let c = Chunk::from_index(0, 100).unwrap();
        assert_eq!(c.range_header_value(), "bytes=0-99");
        let c = Chunk::from_index(2, 10).unwrap();
        assert_eq!(c.range_header_value(), "bytes=20-29");
    }

    #[test]
    fn single_byte_chunks() {
        let c = Chunk::from_index(42, 1).unwrap();
        assert_eq!((c.start, c.end), (42, 42));
        assert_eq!(c.range_header_value(), "bytes=42-42");
        assert_eq!(c.requested_len(), 1);
    }

    #[test]
    fn from_index_past_the_u64_boundary_is_none() {
        assert!(Chunk::from_index(2, 1 << 63).is_none());
        assert!(Chunk::from_index(u64::MAX, 2).is_none());
        // The largest representable start is still issued.
        let c = Chunk::from_index(1, 1 << 63).unwrap();
        assert_eq!(c.start, 1 << 63);
        assert_eq!(c.end, u64::MAX);
    }
}
