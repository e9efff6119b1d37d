//! Concurrent offset writer for the destination file.

use anyhow::{Context, Result};
use std::fs::File;
#[cfg(unix)]
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Writer for the destination file. Safe to clone and use from multiple
/// threads; each `write_at` is independent (pwrite-style), so workers can
/// land their chunks in any order without locking.
///
/// The file is never pre-sized or truncated: positional writes past the
/// current end extend it, and sparse regions read back as zero bytes.
#[derive(Clone)]
pub struct StorageWriter {
    file: Arc<File>,
    path: PathBuf,
}

impl StorageWriter {
    /// Open `path` for writing, creating it if absent. An existing file is
    /// kept as-is and overwritten in place.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::options()
            .write(true)
            .create(true)
            .open(path)
            .with_context(|| format!("failed to open destination file: {}", path.display()))?;
        Ok(StorageWriter {
            file: Arc::new(file),
            path: path.to_path_buf(),
        })
    }

    /// Write `data` at `offset`. Does not change the file's logical cursor; safe for concurrent use.
    #[cfg(unix)]
    pub fn write_at(&self, offset: u64, data: &[u8]) -> Result<()> {
        let n = self
            .file
            .write_at(data, offset)
            .context("storage write_at failed")?;
        if n != data.len() {
            anyhow::bail!("short write: {} of {}", n, data.len());
        }
        Ok(())
    }

    /// Stub for non-Unix (e.g. Windows): use seek + write. Not safe for concurrent use.
    #[cfg(not(unix))]
    pub fn write_at(&self, offset: u64, data: &[u8]) -> Result<()> {
        use std::io::{Seek, SeekFrom, Write};
        let mut f = (*self.file).try_clone()?;
        f.seek(SeekFrom::Start(offset))?;
        f.write_all(data)?;
        Ok(())
    }

    /// Sync file data to disk. Call once after the workers are done.
    pub fn sync(&self) -> Result<()> {
        self.file.sync_all().context("storage sync failed")?;
        Ok(())
    }

    /// Path to the destination file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
