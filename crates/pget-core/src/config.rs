use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default number of concurrent workers.
pub const DEFAULT_WORKERS: usize = 10;
/// Default chunk size: 10 MiB.
pub const DEFAULT_CHUNK_SIZE: u64 = 10 * 1024 * 1024;

/// Global configuration loaded from `~/.config/pget/config.toml`.
///
/// Command-line flags override these values per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PgetConfig {
    /// Number of concurrent download workers.
    pub workers: usize,
    /// Chunk size in bytes.
    pub chunk_size: u64,
}

impl Default for PgetConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pget")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PgetConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PgetConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: PgetConfig = toml::from_str(&data)?;
    Ok(cfg)
}
