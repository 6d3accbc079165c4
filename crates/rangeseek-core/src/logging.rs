//! Logging init: append to a file under the XDG state dir, or fall back to stderr.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,rangeseek=debug,rangeseek_core=debug";
/// Adds per-request transport detail.
const VERBOSE_FILTER: &str = "info,rangeseek=trace,rangeseek_core=trace";

/// `~/.local/state/rangeseek/rangeseek.log`, creating the directory if needed.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rangeseek")?;
    Ok(xdg_dirs.place_state_file("rangeseek.log")?)
}

/// `RUST_LOG` when set, otherwise the built-in default.
fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            VERBOSE_FILTER
        } else {
            DEFAULT_FILTER
        })
    })
}

/// Initialize structured logging to the state-dir log file.
/// Returns Err (log dir unwritable, subscriber already set) so the caller can fall back to stderr.
pub fn init_logging(verbose: bool) -> Result<()> {
    let path = log_file_path()?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install subscriber: {}", e))?;

    tracing::info!("rangeseek logging initialized at {}", path.display());
    Ok(())
}

/// Initialize logging to stderr only. Use when `init_logging` fails so the CLI doesn't crash.
pub fn init_logging_stderr(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}
