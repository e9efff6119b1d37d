//! Destination preflight: refuse to clobber an existing file unless asked.

use anyhow::{Context, Result};
use std::io;
use std::path::Path;

/// Returns true when the download may write to `dest`.
///
/// An existing file blocks the download unless `overwrite` is set; the
/// caller reports the skip and exits cleanly without touching the network.
pub fn may_write(dest: &Path, overwrite: bool) -> Result<bool> {
    match std::fs::metadata(dest) {
        Ok(_) => {
            if overwrite {
                tracing::debug!(dest = %dest.display(), "overwriting existing file in place");
                Ok(true)
            } else {
                Ok(false)
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
        Err(e) => Err(e).with_context(|| format!("failed to stat {}", dest.display())),
    }
}
