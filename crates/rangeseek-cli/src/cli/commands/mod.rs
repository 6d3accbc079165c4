//! CLI command handlers. Each command is in its own file.

mod checksum;
mod completions;
mod probe;
mod read;

use anyhow::{Context, Result};
use std::io::{self, Read, Write};
use clap::Args;
use rangeseek_core::config::RangeseekConfig;
use rangeseek_core::{CurlTransport, SeekableHttpChannel};

pub use checksum::run_checksum;
pub use completions::run_completions;
pub use probe::run_probe;
pub use read::run_read;

/// URL plus the byte range to operate on.
#[derive(Debug, Clone, Args)]
pub struct RangeArgs {
    /// Direct HTTP/HTTPS URL.
    pub url: String,
    /// First byte of the range.
    #[arg(long, default_value = "0", value_name = "BYTES")]
    pub offset: u64,
    /// Number of bytes (default: through the end of the resource).
    #[arg(long, value_name = "BYTES")]
    pub length: Option<u64>,
    /// Override the configured skip threshold.
    #[arg(long, value_name = "BYTES")]
    pub skip_threshold: Option<u64>,
}

pub(crate) fn open_channel(
    cfg: &RangeseekConfig,
    url: &str,
    skip_threshold: Option<u64>,
) -> Result<SeekableHttpChannel<CurlTransport>> {
    let mut options = cfg.channel_options();
    if let Some(t) = skip_threshold {
        options.skip_threshold = t;
    }
    SeekableHttpChannel::open_with_options(url, cfg.curl_transport(), options)
        .with_context(|| format!("open {}", url))
}

/// Opens a channel positioned at `args.offset`; returns it with the number of bytes to read.
pub(crate) fn open_range(
    cfg: &RangeseekConfig,
    args: &RangeArgs,
) -> Result<(SeekableHttpChannel<CurlTransport>, u64)> {
    let mut ch = open_channel(cfg, &args.url, args.skip_threshold)?;
    let available = ch.size().saturating_sub(args.offset);
    let length = args.length.map_or(available, |l| l.min(available));
    if length > 0 {
        let offset = i64::try_from(args.offset).context("offset too large")?;
        ch.seek_to(offset)
            .with_context(|| format!("seek to {}", args.offset))?;
    }
    Ok((ch, length))
}

/// Copies exactly `length` bytes from `reader` to `out`.
///
/// A channel whose body ends early returns a short read and reopens on the
/// next one, so copying resumes until `length` is reached; a read that makes
/// no progress at all is an error.
pub(crate) fn copy_range<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    length: u64,
    out: &mut W,
) -> Result<u64> {
    let mut copied = 0u64;
    while copied < length {
        let n = io::copy(&mut Read::take(&mut *reader, length - copied), out)
            .with_context(|| format!("read after {} bytes", copied))?;
        if n == 0 {
            anyhow::bail!("no progress after {} of {} bytes", copied, length);
        }
        copied += n;
    }
    Ok(copied)
}
