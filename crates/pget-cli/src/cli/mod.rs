//! CLI for the pget downloader.

mod preflight;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use pget_core::config;
use pget_core::downloader::{self, DownloadOptions};
use pget_core::progress::ProgressEvent;
use pget_core::url_model;
use std::io::Write;
use std::path::PathBuf;
use std::sync::mpsc;

/// Top-level CLI: download one file over HTTP with concurrent range requests.
#[derive(Debug, Parser)]
#[command(name = "pget")]
#[command(about = "Concurrent range downloader for single large files", long_about = None)]
pub struct Cli {
    /// Direct HTTP/HTTPS URL to download.
    #[arg(required_unless_present = "completions")]
    pub url: Option<String>,

    /// Destination path (defaults to the filename from the URL).
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Number of concurrent workers (overrides config).
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Chunk size in bytes (overrides config).
    #[arg(long, value_name = "BYTES")]
    pub chunk_size: Option<u64>,

    /// Replace the destination file if it already exists.
    #[arg(long)]
    pub overwrite: bool,

    /// Print shell completions to stdout and exit.
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

pub fn run_from_args() -> Result<()> {
    run(Cli::parse())
}

pub fn run(cli: Cli) -> Result<()> {
    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        return Ok(());
    }
    let Some(url) = cli.url else {
        anyhow::bail!("a URL is required");
    };

    let cfg = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", cfg);

    let dest = cli
        .output
        .unwrap_or_else(|| PathBuf::from(url_model::derive_filename(&url)));
    if !preflight::may_write(&dest, cli.overwrite)? {
        println!(
            "{} already exists; pass --overwrite to replace it",
            dest.display()
        );
        return Ok(());
    }

    let opts = DownloadOptions {
        workers: cli.workers.unwrap_or(cfg.workers),
        chunk_size: cli.chunk_size.unwrap_or(cfg.chunk_size),
    };

    let (progress_tx, progress_rx) = mpsc::channel::<ProgressEvent>();
    let printer = std::thread::spawn(move || {
        for ev in progress_rx {
            match ev {
                ProgressEvent::Chunk { .. } => {
                    print!("\r{:6.2}% downloaded", ev.fraction() * 100.0);
                    let _ = std::io::stdout().flush();
                }
                ProgressEvent::Complete { bytes_done, .. } => {
                    println!("\rdownload complete ({} bytes)", bytes_done);
                }
            }
        }
    });

    let result = downloader::download(&url, &dest, opts, Some(progress_tx));
    // The engine dropped its sender either way; the printer drains and exits.
    let _ = printer.join();
    let report = result?;

    if report.workers_failed > 0 {
        eprintln!(
            "warning: {} worker(s) failed; {} of {} bytes fetched, {} has unwritten gaps",
            report.workers_failed,
            report.bytes_reported,
            report.total_bytes,
            dest.display()
        );
    }
    Ok(())
}
