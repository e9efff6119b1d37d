//! Single-chunk HTTP Range GET and write to storage.

use crate::chunker::Chunk;
use crate::storage::StorageWriter;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::error::FetchError;

/// Downloads a single chunk: GET with Range header, body streamed to storage
/// at the chunk's offset as it arrives.
///
/// For the final chunk the requested range may extend past the resource;
/// range-capable servers truncate the response, so receiving fewer bytes
/// than the nominal span is normal and not checked here.
pub(super) fn fetch_one_chunk(
    url: &str,
    chunk: &Chunk,
    storage: &StorageWriter,
) -> Result<(), FetchError> {
    let storage_error: Arc<Mutex<Option<std::io::Error>>> = Arc::new(Mutex::new(None));
    let storage_error_cb = Arc::clone(&storage_error);
    let chunk_start = chunk.start;
    let storage = storage.clone();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.connect_timeout(Duration::from_secs(30))?;
    // Prefer low-speed timeout: abort if throughput drops below 1 KiB/s for 60s.
    // Keeps large chunks on slow links from being killed by a hard wall-clock timeout.
    easy.low_speed_limit(1024)?;
    easy.low_speed_time(Duration::from_secs(60))?;
    // Safety net: hard timeout after 1 hour so a completely stuck transfer eventually fails.
    easy.timeout(Duration::from_secs(3600))?;

    // Range: curl expects "start-end" (inclusive), not "bytes=start-end".
    easy.range(&format!("{}-{}", chunk.start, chunk.end))?;

    {
        let mut offset = 0u64;
        let mut transfer = easy.transfer();
        transfer.write_function(move |data| {
            match storage.write_at(chunk_start + offset, data) {
                Ok(()) => {
                    offset += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    let io_err = e.downcast::<std::io::Error>().unwrap_or_else(|e| {
                        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
                    });
                    let _ = storage_error_cb.lock().unwrap().replace(io_err);
                    // Returning a short count makes curl abort with a write error.
                    Ok(0)
                }
            }
        })?;
        let perform_result = transfer.perform();
        if let Err(e) = perform_result {
            if e.is_write_error() {
                if let Some(io_err) = storage_error.lock().unwrap().take() {
                    return Err(FetchError::Storage(io_err));
                }
            }
            return Err(FetchError::Curl(e));
        }
    }

    let code = easy.response_code()?;
    if code < 200 || code >= 300 {
        return Err(FetchError::Http(code));
    }

    Ok(())
}
